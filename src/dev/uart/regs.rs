// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! UART Register File
//!
//! The driver talks to a unit's hardware only through [`UartRegisters`].
//! [`KinetisUart`](super::KinetisUart) maps it onto real memory-mapped
//! registers; tests substitute a simulated register file.

use crate::config::{BaudDivisor, DataBits, Parity};

bitflags::bitflags! {
    /// Control bits: direction enables and interrupt sources
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u8 {
        /// Transmitter enable
        const TX_ENABLE = 1 << 0;
        /// Receiver enable
        const RX_ENABLE = 1 << 1;
        /// Interrupt when the transmit data register can take more data
        const TX_READY_IRQ = 1 << 2;
        /// Interrupt when transmission is complete
        const TX_COMPLETE_IRQ = 1 << 3;
        /// Interrupt when a received byte is ready
        const RX_READY_IRQ = 1 << 4;
        /// Interrupt on receiver overrun
        const OVERRUN_IRQ = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Transmit data register empty
        const TX_EMPTY = 1 << 0;
        /// Transmission complete (shift register idle)
        const TX_COMPLETE = 1 << 1;
        /// Receive data register full
        const RX_FULL = 1 << 2;
        /// Receiver overrun
        const OVERRUN = 1 << 3;
    }
}

/// Line settings programmed at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub divisor: BaudDivisor,
    pub parity: Parity,
    pub data_bits: DataBits,
}

/// Decode a 3-bit FIFO size field into a byte depth
///
/// `0` means a single data register; `n` means `2^(n+1)` bytes. Reserved
/// encodings fall back to the single register.
pub const fn fifo_depth_from_field(field: u8) -> usize {
    match field & 0x7 {
        0 => 1,
        n @ 1..=6 => 1 << (n + 1),
        _ => 1,
    }
}

/// Register file of one UART unit
///
/// All methods take `&self`: the register file is shared between
/// foreground code and the unit's interrupt handler.
pub trait UartRegisters {
    /// Current control bits
    fn control(&self) -> Control;

    /// Overwrite the control bits
    fn set_control(&self, control: Control);

    /// Read-modify-write the control bits
    fn modify_control(&self, f: impl FnOnce(Control) -> Control)
    where
        Self: Sized,
    {
        self.set_control(f(self.control()));
    }

    /// Current status flags
    fn status(&self) -> Status;

    /// Pop one received byte (clears `RX_FULL` and `OVERRUN`)
    fn read_data(&self) -> u8;

    /// Push one byte to send
    fn write_data(&self, byte: u8);

    /// Program baud rate, parity and word length
    ///
    /// Only called while the transmitter and receiver are disabled.
    fn configure_line(&self, line: &LineConfig);

    /// Enable both FIFOs and flush their contents
    fn reset_fifos(&self);

    /// Transmit FIFO depth in bytes
    fn tx_fifo_depth(&self) -> usize;

    /// Receive FIFO depth in bytes
    fn rx_fifo_depth(&self) -> usize;

    /// Bytes currently held in the transmit FIFO
    fn tx_fifo_count(&self) -> usize;
}

impl<T: UartRegisters + ?Sized> UartRegisters for &T {
    fn control(&self) -> Control {
        (**self).control()
    }

    fn set_control(&self, control: Control) {
        (**self).set_control(control)
    }

    fn status(&self) -> Status {
        (**self).status()
    }

    fn read_data(&self) -> u8 {
        (**self).read_data()
    }

    fn write_data(&self, byte: u8) {
        (**self).write_data(byte)
    }

    fn configure_line(&self, line: &LineConfig) {
        (**self).configure_line(line)
    }

    fn reset_fifos(&self) {
        (**self).reset_fifos()
    }

    fn tx_fifo_depth(&self) -> usize {
        (**self).tx_fifo_depth()
    }

    fn rx_fifo_depth(&self) -> usize {
        (**self).rx_fifo_depth()
    }

    fn tx_fifo_count(&self) -> usize {
        (**self).tx_fifo_count()
    }
}
