// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Circular Buffer
//!
//! Fixed-capacity byte ring used for the transmit and receive queues. The
//! whole capacity is usable: when the write and read cursors meet, the
//! buffer is either empty or full, and the cached free count tells which.
//! The free count is recomputed from the cursors after every mutation.
//!
//! Multi-byte copies go through [`copy_plan`], which splits a run starting
//! at a cursor into at most two contiguous segments.

use alloc::boxed::Box;
use alloc::vec;
use core::ops::Range;

use crate::err::{Result, UartError};

// ============================================================================
// Cursor Arithmetic
// ============================================================================

/// Contiguous segments covering `len` bytes starting at a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    /// From the cursor towards the physical end of the buffer
    pub first: Range<usize>,
    /// Continuation from index 0 (empty if the run does not wrap)
    pub second: Range<usize>,
}

impl CopyPlan {
    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `len` bytes starting at `cursor` into contiguous segments
///
/// `len` must not exceed `capacity`.
pub fn copy_plan(cursor: usize, len: usize, capacity: usize) -> CopyPlan {
    debug_assert!(cursor < capacity && len <= capacity);
    let to_end = capacity - cursor;
    if len <= to_end {
        CopyPlan {
            first: cursor..cursor + len,
            second: 0..0,
        }
    } else {
        CopyPlan {
            first: cursor..capacity,
            second: 0..len - to_end,
        }
    }
}

/// Advance a cursor by `n` slots
#[inline]
pub fn advance(cursor: usize, n: usize, capacity: usize) -> usize {
    (cursor + n) % capacity
}

/// Empty slots from `write` up to `read`
///
/// Equal cursors are ambiguous; `full` resolves them.
#[inline]
pub fn free_slots(write: usize, read: usize, capacity: usize, full: bool) -> usize {
    if write == read {
        if full {
            0
        } else {
            capacity
        }
    } else {
        (read + capacity - write) % capacity
    }
}

// ============================================================================
// Ring Buffer
// ============================================================================

/// Fixed-capacity circular byte buffer
pub struct RingBuffer {
    buf: Box<[u8]>,
    /// Next slot to fill
    write: usize,
    /// Next slot to consume
    read: usize,
    /// Cached free slot count
    free: usize,
}

impl RingBuffer {
    /// Create an empty buffer of `capacity` bytes (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            write: 0,
            read: 0,
            free: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Free slots
    pub fn space_avail(&self) -> usize {
        self.free
    }

    /// Occupied slots
    pub fn data_avail(&self) -> usize {
        self.capacity() - self.free
    }

    pub fn is_empty(&self) -> bool {
        self.free == self.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.free == 0
    }

    pub fn write_cursor(&self) -> usize {
        self.write
    }

    pub fn read_cursor(&self) -> usize {
        self.read
    }

    /// Append all of `data`, or nothing
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.free {
            return Err(UartError::InsufficientRoom);
        }
        if data.is_empty() {
            return Ok(());
        }

        let plan = copy_plan(self.write, data.len(), self.capacity());
        let (head, tail) = data.split_at(plan.first.len());
        self.buf[plan.first].copy_from_slice(head);
        self.buf[plan.second].copy_from_slice(tail);

        self.write = advance(self.write, data.len(), self.capacity());
        self.free = free_slots(self.write, self.read, self.capacity(), true);
        Ok(())
    }

    /// Append one byte; `false` if the buffer is full
    pub fn write_char(&mut self, c: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.write] = c;
        self.write = advance(self.write, 1, self.capacity());
        self.free = free_slots(self.write, self.read, self.capacity(), true);
        true
    }

    /// Copy up to `out.len()` bytes from the read cursor without consuming
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.data_avail());
        if n == 0 {
            return 0;
        }
        let plan = copy_plan(self.read, n, self.capacity());
        let (head, tail) = out[..n].split_at_mut(plan.first.len());
        head.copy_from_slice(&self.buf[plan.first]);
        tail.copy_from_slice(&self.buf[plan.second]);
        n
    }

    /// Drop up to `n` bytes from the read cursor, returning how many
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.data_avail());
        if n == 0 {
            return 0;
        }
        self.read = advance(self.read, n, self.capacity());
        self.free = free_slots(self.write, self.read, self.capacity(), false);
        n
    }

    /// Move up to `out.len()` bytes out of the buffer
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = self.peek(out);
        self.consume(n)
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &[u8] {
        &self.buf
    }
}
