// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Synchronization Primitives
//!
//! State shared between foreground code and a unit's interrupt handler is
//! only touched inside a critical section that masks that unit's interrupt
//! line. Spin waits on hardware flags are bounded and happen outside of
//! critical sections.
//!
//! # Primitives
//!
//! - **CriticalSection**: masks one unit's line for the guard's lifetime
//! - **IrqLocked**: a `spin::Mutex` guard taken inside a critical section
//! - **spin_until**: bounded busy-wait on a hardware condition

pub mod critical;

// Re-exports
pub use critical::*;
