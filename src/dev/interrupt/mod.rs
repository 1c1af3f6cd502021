// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt Controllers
//!
//! The UART driver does not own the vector table. It requires an
//! [`InterruptController`] that routes a unit's interrupt line to the
//! driver's dispatch entry points ([`UartRegistry::on_event`] or
//! [`UartRegistry::service`]) and that can mask one unit's line at a time
//! for critical sections.
//!
//! # Supported controllers
//!
//! - **NVIC**: Cortex-M Nested Vectored Interrupt Controller (target only)
//!
//! [`UartRegistry::on_event`]: crate::UartRegistry::on_event
//! [`UartRegistry::service`]: crate::UartRegistry::service

use crate::config::{UnitId, MAX_UART_UNITS};

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod nvic;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use nvic::Nvic;

/// NVIC (status line, error line) of each unit
///
/// The status line carries transmit and receive events, the error line
/// carries overruns.
pub const UART_IRQ_LINES: [(u16, u16); MAX_UART_UNITS] = [
    (31, 32), // UART0
    (33, 34), // UART1
    (35, 36), // UART2
    (37, 38), // UART3
    (66, 67), // UART4
    (68, 69), // UART5
];

/// A UART interrupt event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqEvent {
    /// The transmitter can accept more data
    ReadyToSend,
    /// A received byte is waiting in the data register
    DataReady,
    /// The receiver lost a byte
    Overrun,
}

bitflags::bitflags! {
    /// Set of UART interrupt events
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqEvents: u8 {
        const READY_TO_SEND = 1 << 0;
        const DATA_READY = 1 << 1;
        const OVERRUN = 1 << 2;
    }
}

/// Interrupt controller capability required by the driver
///
/// Implementations must be callable from both foreground and interrupt
/// context.
pub trait InterruptController {
    /// Route `events` of `unit` to the driver and unmask the line
    fn attach(&self, unit: UnitId, events: IrqEvents);

    /// Mask the line of `unit` and stop routing its events
    fn detach(&self, unit: UnitId);

    /// Mask the line of `unit`
    ///
    /// Returns `true` if the line was unmasked before the call.
    fn mask(&self, unit: UnitId) -> bool;

    /// Restore the mask state returned by [`mask`](Self::mask)
    fn restore(&self, unit: UnitId, was_unmasked: bool);
}

impl<T: InterruptController + ?Sized> InterruptController for &T {
    fn attach(&self, unit: UnitId, events: IrqEvents) {
        (**self).attach(unit, events)
    }

    fn detach(&self, unit: UnitId) {
        (**self).detach(unit)
    }

    fn mask(&self, unit: UnitId) -> bool {
        (**self).mask(unit)
    }

    fn restore(&self, unit: UnitId, was_unmasked: bool) {
        (**self).restore(unit, was_unmasked)
    }
}
