// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Device Drivers
//!
//! The UART driver and the interrupt controller interface it depends on.

// UART driver
pub mod uart;

// Interrupt controllers
pub mod interrupt;
