// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Cortex-M NVIC Backend
//!
//! [`InterruptController`] implementation for the Nested Vectored Interrupt
//! Controller. Each UART unit has two lines: the status line (transmit,
//! receive) and the error line (overrun). Both are enabled and masked
//! together. The vector table itself is provided by the board crate, whose
//! handlers call [`UartRegistry::service`](crate::UartRegistry::service).

use cortex_m::asm;
use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

use super::{InterruptController, IrqEvents, UART_IRQ_LINES};
use crate::config::UnitId;

// ============================================================================
// UART Interrupt Lines
// ============================================================================

/// NVIC line number of a UART interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartIrq(u16);

// SAFETY: every value comes from `UART_IRQ_LINES`, which only holds lines
// the device implements.
unsafe impl InterruptNumber for UartIrq {
    #[inline]
    fn number(self) -> u16 {
        self.0
    }
}

#[inline]
fn enable(irq: UartIrq) {
    NVIC::unpend(irq);
    // SAFETY: only called from `attach`, outside any critical section of
    // the unit.
    unsafe { NVIC::unmask(irq) };
}

#[inline]
fn disable(irq: UartIrq) {
    NVIC::mask(irq);
    // The line must be off before the caller touches shared state
    asm::dsb();
    asm::isb();
}

// ============================================================================
// Controller
// ============================================================================

/// NVIC-backed interrupt controller
#[derive(Debug, Clone, Copy, Default)]
pub struct Nvic;

impl Nvic {
    fn lines(unit: UnitId) -> (UartIrq, UartIrq) {
        let (status, error) = UART_IRQ_LINES[unit.index()];
        (UartIrq(status), UartIrq(error))
    }
}

impl InterruptController for Nvic {
    fn attach(&self, unit: UnitId, events: IrqEvents) {
        let (status, error) = Self::lines(unit);
        if events.intersects(IrqEvents::READY_TO_SEND | IrqEvents::DATA_READY) {
            enable(status);
        }
        if events.contains(IrqEvents::OVERRUN) {
            enable(error);
        }
        log_debug!(
            "NVIC: UART{} attached, lines {}/{}",
            unit.raw(),
            status.number(),
            error.number()
        );
    }

    fn detach(&self, unit: UnitId) {
        let (status, error) = Self::lines(unit);
        disable(status);
        disable(error);
        NVIC::unpend(status);
        NVIC::unpend(error);
    }

    fn mask(&self, unit: UnitId) -> bool {
        let (status, error) = Self::lines(unit);
        let was_unmasked = NVIC::is_enabled(status);
        disable(status);
        disable(error);
        was_unmasked
    }

    fn restore(&self, unit: UnitId, was_unmasked: bool) {
        if !was_unmasked {
            return;
        }
        let (status, error) = Self::lines(unit);
        // SAFETY: restores a state the line had before `mask`.
        unsafe {
            NVIC::unmask(status);
            NVIC::unmask(error);
        }
    }
}
