// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Logging
//!
//! Thin logging macros used throughout the driver. With the `log` feature
//! (enabled by default) they forward to the `log` crate under the `uart`
//! target; without it they compile to nothing but still type-check their
//! arguments.
//!
//! # Usage
//!
//! ```rust,ignore
//! log_info!("UART{}: configured at {} baud", unit, baud);
//! log_warn!("UART{}: write of {} bytes rejected", unit, len);
//! ```
//!
//! Interrupt-path code only logs at trace level.

#[cfg(feature = "log")]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {
        ::log::$level!(target: "uart", $($arg)*)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {{
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! log_trace {
    ($($arg:tt)*) => { log_at!(trace, $($arg)*) };
}

macro_rules! log_debug {
    ($($arg:tt)*) => { log_at!(debug, $($arg)*) };
}

macro_rules! log_info {
    ($($arg:tt)*) => { log_at!(info, $($arg)*) };
}

macro_rules! log_warn {
    ($($arg:tt)*) => { log_at!(warn, $($arg)*) };
}

macro_rules! log_error {
    ($($arg:tt)*) => { log_at!(error, $($arg)*) };
}
