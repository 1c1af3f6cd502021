// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! UART Configuration
//!
//! Configuration consumed by [`UartRegistry::init`](crate::UartRegistry::init):
//! unit selection, operating mode, line settings and buffer sizes, plus the
//! clock information needed to derive the baud rate divisor.
//!
//! Pin multiplexing and clock gating belong to the board layer. The pins
//! carried here are informational and the flow-control pins are ignored.

use crate::err::{Result, UartError};

/// Number of UART units on the part
pub const MAX_UART_UNITS: usize = 6;

/// Buffer size used when a configuration requests zero bytes
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Largest baud fine-adjust value (in 1/32 steps)
pub const MAX_BAUD_FRACTION: u8 = 31;

/// Largest value of the 13-bit baud rate modulo divisor
pub const MAX_BAUD_DIVISOR: u16 = 0x1FFF;

// ============================================================================
// Unit Identifier
// ============================================================================

/// Bounds-checked UART unit number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u8);

impl UnitId {
    /// Validate a raw unit number
    pub const fn new(raw: u8) -> Option<Self> {
        if (raw as usize) < MAX_UART_UNITS {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Raw unit number
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Index into per-unit tables
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Pins
// ============================================================================

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

/// A pin on a GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinId {
    pub port: Port,
    pub number: u8,
}

impl PinId {
    pub const fn new(port: Port, number: u8) -> Self {
        Self { port, number }
    }
}

/// Pins routed to the unit by the board layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pins {
    pub rx: Option<PinId>,
    pub tx: Option<PinId>,
    /// Clear-to-send (unused)
    pub cts: Option<PinId>,
    /// Ready-to-send (unused)
    pub rts: Option<PinId>,
}

// ============================================================================
// Line Settings
// ============================================================================

/// Which directions of the unit are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Receiver only
    Receiver,
    /// Transmitter only
    Transmitter,
    /// Transmitter and receiver
    Transceiver,
}

impl Mode {
    pub const fn transmits(self) -> bool {
        matches!(self, Mode::Transmitter | Mode::Transceiver)
    }

    pub const fn receives(self) -> bool {
        matches!(self, Mode::Receiver | Mode::Transceiver)
    }
}

/// Parity generation and checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Word length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Eight,
    /// Extended 9-bit words
    Nine,
}

// ============================================================================
// Clocks
// ============================================================================

/// Module clock frequencies feeding the UART units
///
/// Units 0 and 1 run from the system clock, the others from the bus clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clocks {
    pub system_hz: u32,
    pub bus_hz: u32,
}

impl Clocks {
    /// 120 MHz core with system and bus clocks divided by two
    pub const DEFAULT: Self = Self {
        system_hz: 60_000_000,
        bus_hz: 60_000_000,
    };

    /// Clock feeding the given unit
    pub const fn module_clock_hz(&self, unit: UnitId) -> u32 {
        match unit.raw() {
            0 | 1 => self.system_hz,
            _ => self.bus_hz,
        }
    }
}

impl Default for Clocks {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Baud rate generator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor {
    /// 13-bit modulo divisor
    pub sbr: u16,
    /// Fine adjust in 1/32 steps
    pub fine_adjust: u8,
}

impl BaudDivisor {
    /// Derive the divisor for `baud` from the module clock
    ///
    /// `baud = module_clock / (16 * (sbr + fine_adjust / 32))`; the fine
    /// adjust is the caller's correction factor. Returns `None` when the
    /// divisor does not fit the 13-bit field.
    ///
    /// `fine_adjust` is written to the fine-adjust field as given and is not
    /// subtracted from the divisor; configurations that fold the fraction
    /// into `clock / baud` must pass the 1/32 remainder of
    /// `clock / (16 * baud)` instead.
    pub const fn compute(module_clock_hz: u32, baud: u32, fine_adjust: u8) -> Option<Self> {
        if baud == 0 || fine_adjust > MAX_BAUD_FRACTION {
            return None;
        }
        let sbr = module_clock_hz as u64 / (16 * baud as u64);
        if sbr == 0 || sbr > MAX_BAUD_DIVISOR as u64 {
            return None;
        }
        Some(Self {
            sbr: sbr as u16,
            fine_adjust,
        })
    }

    /// High register half (SBR[12:8])
    pub const fn high(&self) -> u8 {
        ((self.sbr >> 8) & 0x1F) as u8
    }

    /// Low register half (SBR[7:0])
    pub const fn low(&self) -> u8 {
        (self.sbr & 0xFF) as u8
    }
}

// ============================================================================
// Unit Configuration
// ============================================================================

/// Configuration of one UART unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub pins: Pins,
    /// Hardware unit number
    pub unit: u8,
    pub mode: Mode,
    pub baud_rate: u32,
    /// Baud correction factor in 1/32 steps
    pub baud_fraction: u8,
    pub data_bits: DataBits,
    pub parity: Parity,
    /// Requested receive buffer size (0 selects the default)
    pub rx_buffer_size: usize,
    /// Requested transmit buffer size (0 selects the default)
    pub tx_buffer_size: usize,
}

impl UartConfig {
    /// 8N1 transceiver with default buffer sizes
    pub const fn new(unit: u8, baud_rate: u32) -> Self {
        Self {
            pins: Pins {
                rx: None,
                tx: None,
                cts: None,
                rts: None,
            },
            unit,
            mode: Mode::Transceiver,
            baud_rate,
            baud_fraction: 0,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            rx_buffer_size: 0,
            tx_buffer_size: 0,
        }
    }

    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn with_pins(mut self, pins: Pins) -> Self {
        self.pins = pins;
        self
    }

    pub const fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub const fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    pub const fn with_baud_fraction(mut self, baud_fraction: u8) -> Self {
        self.baud_fraction = baud_fraction;
        self
    }

    pub const fn with_buffer_sizes(mut self, rx: usize, tx: usize) -> Self {
        self.rx_buffer_size = rx;
        self.tx_buffer_size = tx;
        self
    }

    /// Effective transmit buffer capacity
    pub const fn tx_capacity(&self) -> usize {
        if self.tx_buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.tx_buffer_size
        }
    }

    /// Effective receive buffer capacity
    pub const fn rx_capacity(&self) -> usize {
        if self.rx_buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.rx_buffer_size
        }
    }

    /// Validated unit id
    pub fn unit_id(&self) -> Result<UnitId> {
        UnitId::new(self.unit).ok_or(UartError::InvalidUnit)
    }

    /// Check the configuration against the clock tree
    ///
    /// Returns the unit id and the baud divisor to program.
    pub fn validate(&self, clocks: &Clocks) -> Result<(UnitId, BaudDivisor)> {
        let unit = self.unit_id()?;
        let divisor = BaudDivisor::compute(
            clocks.module_clock_hz(unit),
            self.baud_rate,
            self.baud_fraction,
        )
        .ok_or(UartError::InvalidConfig)?;
        Ok((unit, divisor))
    }
}
