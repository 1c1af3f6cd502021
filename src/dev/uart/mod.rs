// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! UART Driver
//!
//! Interrupt-driven, ring-buffered driver for up to
//! [`MAX_UART_UNITS`](crate::config::MAX_UART_UNITS) hardware units.
//!
//! # Structure
//!
//! - **ring**: circular byte buffer and cursor arithmetic
//! - **tx / rx**: pure drain and fill steps over the ring buffers
//! - **instance**: one configured unit; runs the steps against its registers
//! - **registry**: unit table, handles and the public API
//! - **regs**: register file interface; **kinetis**: memory-mapped backend
//!
//! # Usage
//!
//! - **Buffered**: `write_data` queues bytes and starts a drain step; the
//!   unit's "ready to send" interrupt runs further steps until the queue is
//!   empty. Received bytes are queued by the "data ready" interrupt and
//!   collected with `read_data`.
//! - **Unbuffered**: `put_char` / `get_char` use the data register directly.

pub mod instance;
pub mod kinetis;
pub mod regs;
pub mod registry;
pub mod ring;
pub mod rx;
pub mod tx;

// Re-exports
pub use instance::UartInstance;
pub use kinetis::{KinetisUart, UART_BASES};
pub use regs::{Control, LineConfig, Status, UartRegisters};
pub use registry::{UartHandle, UartRegistry, INVALID_HANDLE};
pub use tx::TxState;
