// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Per-Unit Critical Sections
//!
//! On a single core, a spinlock shared with an interrupt handler deadlocks
//! as soon as the handler preempts the lock holder. Foreground code
//! therefore masks the unit's interrupt line before taking the lock, and
//! releases the lock before restoring the line, so the handler never finds
//! the lock held.

use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

use crate::config::UnitId;
use crate::dev::interrupt::InterruptController;

/// Iteration bound for hardware flag waits
pub const SPIN_LIMIT: usize = 100_000;

/// Masks one unit's interrupt line until dropped
pub struct CriticalSection<'a, I: InterruptController + ?Sized> {
    irq: &'a I,
    unit: UnitId,
    was_unmasked: bool,
}

impl<'a, I: InterruptController + ?Sized> CriticalSection<'a, I> {
    /// Mask the line of `unit`
    pub fn enter(irq: &'a I, unit: UnitId) -> Self {
        let was_unmasked = irq.mask(unit);
        Self {
            irq,
            unit,
            was_unmasked,
        }
    }
}

impl<I: InterruptController + ?Sized> Drop for CriticalSection<'_, I> {
    fn drop(&mut self) {
        self.irq.restore(self.unit, self.was_unmasked);
    }
}

/// Mutex guard held inside a critical section
///
/// Field order matters: the guard drops (unlocks) before the critical
/// section restores the line.
pub struct IrqLocked<'a, T, I: InterruptController + ?Sized> {
    guard: MutexGuard<'a, T>,
    _cs: CriticalSection<'a, I>,
}

impl<T, I: InterruptController + ?Sized> Deref for IrqLocked<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, I: InterruptController + ?Sized> DerefMut for IrqLocked<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// Mask the line of `unit`, then lock `mutex`
pub fn lock_masked<'a, T, I: InterruptController + ?Sized>(
    mutex: &'a Mutex<T>,
    irq: &'a I,
    unit: UnitId,
) -> IrqLocked<'a, T, I> {
    let cs = CriticalSection::enter(irq, unit);
    IrqLocked {
        guard: mutex.lock(),
        _cs: cs,
    }
}

/// Busy-wait until `cond` holds, at most [`SPIN_LIMIT`] polls
///
/// Returns `false` if the limit was reached.
#[inline]
pub fn spin_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..SPIN_LIMIT {
        if cond() {
            return true;
        }
        core::hint::spin_loop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sim::SimIrq;

    #[test]
    fn test_critical_section_restores_previous_state() {
        let irq = SimIrq::new();
        let unit = UnitId::new(2).unwrap();
        irq.attach(unit, crate::IrqEvents::all());

        {
            let _cs = CriticalSection::enter(&irq, unit);
            assert!(irq.is_masked(unit));
            {
                // Nested section leaves the line masked on exit
                let _inner = CriticalSection::enter(&irq, unit);
            }
            assert!(irq.is_masked(unit));
        }
        assert!(!irq.is_masked(unit));
    }

    #[test]
    fn test_lock_masked_unlocks_before_unmask() {
        let irq = SimIrq::new();
        let unit = UnitId::new(0).unwrap();
        irq.attach(unit, crate::IrqEvents::all());
        let value = Mutex::new(5u32);

        {
            let mut locked = lock_masked(&value, &irq, unit);
            *locked += 1;
            assert!(value.try_lock().is_none());
            assert!(irq.is_masked(unit));
        }

        assert!(!irq.is_masked(unit));
        assert_eq!(*value.lock(), 6);
    }

    #[test]
    fn test_spin_until() {
        let mut polls = 0;
        assert!(spin_until(|| {
            polls += 1;
            polls == 3
        }));
        assert_eq!(polls, 3);
        assert!(!spin_until(|| false));
    }
}
