// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kinetis UART Register Block
//!
//! Memory-mapped implementation of [`UartRegisters`] for the 8-bit UART
//! blocks of Kinetis K-series parts (six units, FIFO on every unit).
//!
//! # Register Map
//!
//! | Offset | Name   | Description                      |
//! |--------|--------|----------------------------------|
//! | 0x00   | BDH    | Baud Rate High (SBR[12:8])       |
//! | 0x01   | BDL    | Baud Rate Low (SBR[7:0])         |
//! | 0x02   | C1     | Control 1 (word length, parity)  |
//! | 0x03   | C2     | Control 2 (enables, interrupts)  |
//! | 0x04   | S1     | Status 1                         |
//! | 0x06   | C3     | Control 3 (error interrupts)     |
//! | 0x07   | D      | Data                             |
//! | 0x0A   | C4     | Control 4 (baud fine adjust)     |
//! | 0x10   | PFIFO  | FIFO Parameters                  |
//! | 0x11   | CFIFO  | FIFO Control                     |
//! | 0x14   | TCFIFO | Transmit FIFO Count              |

use core::ptr::{read_volatile, write_volatile};

use super::regs::{fifo_depth_from_field, Control, LineConfig, Status, UartRegisters};
use crate::config::{DataBits, Parity, UnitId, MAX_UART_UNITS};

// ============================================================================
// Register Offsets
// ============================================================================

const UART_BDH: usize = 0x00;
const UART_BDL: usize = 0x01;
const UART_C1: usize = 0x02;
const UART_C2: usize = 0x03;
const UART_S1: usize = 0x04;
const UART_C3: usize = 0x06;
const UART_D: usize = 0x07;
const UART_C4: usize = 0x0A;
const UART_PFIFO: usize = 0x10;
const UART_CFIFO: usize = 0x11;
const UART_TCFIFO: usize = 0x14;

// ============================================================================
// Register Bits
// ============================================================================

const C1_M: u8 = 1 << 4; // 9-bit mode
const C1_PE: u8 = 1 << 1; // Parity enable
const C1_PT: u8 = 1 << 0; // Odd parity

const C2_TIE: u8 = 1 << 7; // TX data register empty interrupt
const C2_TCIE: u8 = 1 << 6; // TX complete interrupt
const C2_RIE: u8 = 1 << 5; // RX full interrupt
const C2_TE: u8 = 1 << 3; // Transmitter enable
const C2_RE: u8 = 1 << 2; // Receiver enable

const C3_ORIE: u8 = 1 << 3; // Overrun interrupt

const S1_TDRE: u8 = 1 << 7; // TX data register empty
const S1_TC: u8 = 1 << 6; // TX complete
const S1_RDRF: u8 = 1 << 5; // RX data register full
const S1_OR: u8 = 1 << 3; // Receiver overrun

const C4_BRFA_MASK: u8 = 0x1F;

const PFIFO_TXFE: u8 = 1 << 7;
const PFIFO_RXFE: u8 = 1 << 3;

const CFIFO_TXFLUSH: u8 = 1 << 7;
const CFIFO_RXFLUSH: u8 = 1 << 6;

// ============================================================================
// Unit Base Addresses
// ============================================================================

/// Base address of each unit's register block
pub const UART_BASES: [usize; MAX_UART_UNITS] = [
    0x4006_A000, // UART0
    0x4006_B000, // UART1
    0x4006_C000, // UART2
    0x4006_D000, // UART3
    0x400E_A000, // UART4
    0x400E_B000, // UART5
];

// ============================================================================
// Register Access
// ============================================================================

/// Read from a UART register
#[inline]
unsafe fn uart_read(base: usize, offset: usize) -> u8 {
    read_volatile((base + offset) as *const u8)
}

/// Write to a UART register
#[inline]
unsafe fn uart_write(base: usize, offset: usize, value: u8) {
    write_volatile((base + offset) as *mut u8, value);
}

/// One memory-mapped UART unit
#[derive(Debug)]
pub struct KinetisUart {
    base: usize,
}

impl KinetisUart {
    /// Wrap the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of a clocked UART register block, and no
    /// other owner may access that block.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Register block of `unit`
    ///
    /// # Safety
    ///
    /// Same requirements as [`KinetisUart::new`]: the unit's clock gate must
    /// be open and the block must not be aliased.
    pub const unsafe fn for_unit(unit: UnitId) -> Self {
        Self::new(UART_BASES[unit.index()])
    }

    #[inline]
    fn read(&self, offset: usize) -> u8 {
        // SAFETY: `new` guarantees a valid, exclusively owned block.
        unsafe { uart_read(self.base, offset) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u8) {
        // SAFETY: as in `read`.
        unsafe { uart_write(self.base, offset, value) }
    }
}

impl UartRegisters for KinetisUart {
    fn control(&self) -> Control {
        let c2 = self.read(UART_C2);
        let c3 = self.read(UART_C3);
        let mut control = Control::empty();
        control.set(Control::TX_ENABLE, c2 & C2_TE != 0);
        control.set(Control::RX_ENABLE, c2 & C2_RE != 0);
        control.set(Control::TX_READY_IRQ, c2 & C2_TIE != 0);
        control.set(Control::TX_COMPLETE_IRQ, c2 & C2_TCIE != 0);
        control.set(Control::RX_READY_IRQ, c2 & C2_RIE != 0);
        control.set(Control::OVERRUN_IRQ, c3 & C3_ORIE != 0);
        control
    }

    fn set_control(&self, control: Control) {
        let mut c2 = self.read(UART_C2) & !(C2_TE | C2_RE | C2_TIE | C2_TCIE | C2_RIE);
        if control.contains(Control::TX_ENABLE) {
            c2 |= C2_TE;
        }
        if control.contains(Control::RX_ENABLE) {
            c2 |= C2_RE;
        }
        if control.contains(Control::TX_READY_IRQ) {
            c2 |= C2_TIE;
        }
        if control.contains(Control::TX_COMPLETE_IRQ) {
            c2 |= C2_TCIE;
        }
        if control.contains(Control::RX_READY_IRQ) {
            c2 |= C2_RIE;
        }

        let mut c3 = self.read(UART_C3) & !C3_ORIE;
        if control.contains(Control::OVERRUN_IRQ) {
            c3 |= C3_ORIE;
        }

        self.write(UART_C3, c3);
        self.write(UART_C2, c2);
    }

    fn status(&self) -> Status {
        let s1 = self.read(UART_S1);
        let mut status = Status::empty();
        status.set(Status::TX_EMPTY, s1 & S1_TDRE != 0);
        status.set(Status::TX_COMPLETE, s1 & S1_TC != 0);
        status.set(Status::RX_FULL, s1 & S1_RDRF != 0);
        status.set(Status::OVERRUN, s1 & S1_OR != 0);
        status
    }

    fn read_data(&self) -> u8 {
        // S1 then D clears RDRF and OR
        let _ = self.read(UART_S1);
        self.read(UART_D)
    }

    fn write_data(&self, byte: u8) {
        self.write(UART_D, byte);
    }

    fn configure_line(&self, line: &LineConfig) {
        // BDL write latches the new divisor, so BDH goes first
        self.write(UART_BDH, line.divisor.high());
        self.write(UART_BDL, line.divisor.low());

        let c4 = self.read(UART_C4) & !C4_BRFA_MASK;
        self.write(UART_C4, c4 | (line.divisor.fine_adjust & C4_BRFA_MASK));

        let mut c1 = 0;
        if line.data_bits == DataBits::Nine {
            c1 |= C1_M;
        }
        match line.parity {
            Parity::None => {}
            Parity::Even => c1 |= C1_PE,
            Parity::Odd => c1 |= C1_PE | C1_PT,
        }
        self.write(UART_C1, c1);
    }

    fn reset_fifos(&self) {
        let pfifo = self.read(UART_PFIFO);
        self.write(UART_PFIFO, pfifo | PFIFO_TXFE | PFIFO_RXFE);
        let cfifo = self.read(UART_CFIFO);
        self.write(UART_CFIFO, cfifo | CFIFO_TXFLUSH | CFIFO_RXFLUSH);
    }

    fn tx_fifo_depth(&self) -> usize {
        fifo_depth_from_field(self.read(UART_PFIFO) >> 4)
    }

    fn rx_fifo_depth(&self) -> usize {
        fifo_depth_from_field(self.read(UART_PFIFO))
    }

    fn tx_fifo_count(&self) -> usize {
        self.read(UART_TCFIFO) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaudDivisor;

    /// Register block backed by host memory
    fn fake_block() -> alloc::boxed::Box<[u8; 0x20]> {
        alloc::boxed::Box::new([0u8; 0x20])
    }

    #[test]
    fn test_control_round_trip_through_c2_c3() {
        let mut block = fake_block();
        let uart = unsafe { KinetisUart::new(block.as_mut_ptr() as usize) };

        let control = Control::TX_ENABLE | Control::RX_READY_IRQ | Control::OVERRUN_IRQ;
        uart.set_control(control);
        assert_eq!(block[UART_C2], C2_TE | C2_RIE);
        assert_eq!(block[UART_C3], C3_ORIE);
        assert_eq!(uart.control(), control);
    }

    #[test]
    fn test_configure_line() {
        let mut block = fake_block();
        let uart = unsafe { KinetisUart::new(block.as_mut_ptr() as usize) };

        uart.configure_line(&LineConfig {
            divisor: BaudDivisor::compute(60_000_000, 9600, 4).unwrap(),
            parity: Parity::Odd,
            data_bits: DataBits::Nine,
        });
        assert_eq!(block[UART_BDH], 0x01);
        assert_eq!(block[UART_BDL], 0x86);
        assert_eq!(block[UART_C4], 4);
        assert_eq!(block[UART_C1], C1_M | C1_PE | C1_PT);
    }

    #[test]
    fn test_status_and_fifo_fields() {
        let mut block = fake_block();
        block[UART_S1] = S1_TDRE | S1_OR;
        block[UART_PFIFO] = (2 << 4) | 1;
        block[UART_TCFIFO] = 3;
        let uart = unsafe { KinetisUart::new(block.as_mut_ptr() as usize) };

        assert_eq!(uart.status(), Status::TX_EMPTY | Status::OVERRUN);
        assert_eq!(uart.tx_fifo_depth(), 8);
        assert_eq!(uart.rx_fifo_depth(), 4);
        assert_eq!(uart.tx_fifo_count(), 3);
    }
}
