// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Tests
//!
//! End-to-end tests that run the registry against simulated hardware.

pub(crate) mod sim;
