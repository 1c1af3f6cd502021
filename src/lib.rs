// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux UART Driver
//!
//! Interrupt-driven, ring-buffered driver for the UART units of a
//! microcontroller. Several hardware units are multiplexed behind one
//! [`UartRegistry`]; each configured unit owns a transmit and a receive
//! ring buffer that decouple application-speed reads and writes from the
//! byte-at-a-time hardware transfer done in interrupt context.
//!
//! # Usage
//!
//! ```rust,ignore
//! static UARTS: UartRegistry<KinetisUart, Nvic> = UartRegistry::new(Nvic, Clocks::DEFAULT);
//!
//! let config = UartConfig::new(0, 9600).with_mode(Mode::Transceiver);
//! let uart0 = UARTS.init(&config, unsafe { KinetisUart::for_unit(config.unit_id()?) })?;
//! UARTS.write_data(uart0, b"hello\r\n")?;
//!
//! // From the UART0 status vector:
//! UARTS.service(uart0.unit());
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod debug;

pub mod config;
pub mod dev;
pub mod err;
pub mod sync;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::{Clocks, DataBits, Mode, Parity, PinId, Pins, Port, UartConfig, UnitId};
pub use dev::interrupt::{InterruptController, IrqEvent, IrqEvents};
pub use dev::uart::{
    Control, KinetisUart, LineConfig, Status, TxState, UartHandle, UartRegisters, UartRegistry,
    INVALID_HANDLE,
};
pub use err::{Result, UartError};
