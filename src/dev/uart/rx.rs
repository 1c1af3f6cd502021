// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Receive Queue
//!
//! Pure half of the receive fill path. The interrupt handler feeds bytes
//! with [`RxQueue::fill`] and reports hardware overruns with
//! [`RxQueue::mark_overrun`]; foreground code drains the queue with
//! [`RxQueue::read`].

use super::ring::RingBuffer;

/// Receive ring buffer plus status flags
pub struct RxQueue {
    ring: RingBuffer,
    /// Set by the fill path, cleared once the caller has drained the queue
    new_data: bool,
    /// Hardware overrun seen since last cleared
    overrun: bool,
    /// Bytes dropped because the queue was full
    dropped: usize,
}

impl RxQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity),
            new_data: false,
            overrun: false,
            dropped: 0,
        }
    }

    /// Store a byte read from the data register
    ///
    /// Returns `false` and counts the byte as dropped if the queue is full.
    pub fn fill(&mut self, byte: u8) -> bool {
        if !self.ring.write_char(byte) {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        self.new_data = true;
        true
    }

    /// Record a hardware overrun
    pub fn mark_overrun(&mut self) {
        self.overrun = true;
    }

    /// Read and clear the overrun indicator
    pub fn take_overrun(&mut self) -> bool {
        core::mem::replace(&mut self.overrun, false)
    }

    pub fn overrun(&self) -> bool {
        self.overrun
    }

    pub fn has_new_data(&self) -> bool {
        self.new_data
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// Move buffered bytes into `out`
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = self.ring.read(out);
        if self.ring.is_empty() {
            self.new_data = false;
        }
        n
    }
}
