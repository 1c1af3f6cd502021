// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Error Codes
//!
//! Errors returned by the UART driver. Every failure is reported as a
//! value; nothing in the driver panics or aborts, and the interrupt paths
//! record conditions as flags instead of returning errors.

use core::fmt;

/// Status code type for the C-style view of driver results
pub type Status = i16;

/// Success status code
pub const UART_OK: Status = 0;

/// Result type for driver operations
pub type Result<T = ()> = core::result::Result<T, UartError>;

/// UART driver errors
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// The unit already has a configured instance
    UnitBusy = -1,
    /// Not enough free space in the transmit buffer; nothing was written
    InsufficientRoom = -2,
    /// Unit number outside the hardware's unit range
    InvalidUnit = -3,
    /// Configuration cannot be programmed into the hardware
    InvalidConfig = -4,
    /// Transmit requested on a receive-only unit
    NotTransmitter = -5,
    /// The receiver lost data because the data register was not read in time
    Overrun = -6,
    /// The handle refers to a unit with no configured instance
    NotConfigured = -7,
}

impl UartError {
    /// Convert error to status code
    pub fn to_status(self) -> Status {
        self as Status
    }

    /// Short description of the error
    pub fn as_str(self) -> &'static str {
        match self {
            UartError::UnitBusy => "unit busy",
            UartError::InsufficientRoom => "insufficient room in transmit buffer",
            UartError::InvalidUnit => "invalid unit",
            UartError::InvalidConfig => "invalid configuration",
            UartError::NotTransmitter => "unit is not a transmitter",
            UartError::Overrun => "receive overrun",
            UartError::NotConfigured => "unit not configured",
        }
    }
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UartError> for Status {
    fn from(err: UartError) -> Self {
        err.to_status()
    }
}

/// Collapse a result into its status code (`UART_OK` on success)
pub fn status_of<T>(result: &Result<T>) -> Status {
    match result {
        Ok(_) => UART_OK,
        Err(err) => err.to_status(),
    }
}
