// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Transmit Queue
//!
//! Pure half of the transmit drain algorithm. A drain step is split in
//! two so that the hardware spin waits happen outside of any critical
//! section:
//!
//! 1. [`TxQueue::begin_drain`] claims a burst of up to `hw_free` bytes;
//! 2. the caller pushes the burst into the hardware;
//! 3. [`TxQueue::finish_drain`] commits the bytes actually sent.
//!
//! Claimed bytes stay in the ring until committed, so the producer cannot
//! overwrite them, and a second context that starts a step meanwhile sees
//! [`DrainStep::Busy`].

use super::ring::RingBuffer;
use crate::err::Result;

/// Largest burst a single drain step moves into the hardware
pub const MAX_BURST: usize = 128;

/// Transmitter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Nothing pending; send interrupt disabled
    Idle,
    /// Bytes pending; send interrupt armed
    Transmitting,
}

/// Outcome of [`TxQueue::begin_drain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStep {
    /// Nothing left to send; disable the send interrupt
    Idle,
    /// Another context has a burst in flight
    Busy,
    /// Bytes pending but the hardware FIFO is full; keep the interrupt armed
    Stalled,
    /// Push this many bytes, then call [`TxQueue::finish_drain`]
    Send(usize),
}

/// Transmit ring buffer plus drain state
pub struct TxQueue {
    ring: RingBuffer,
    state: TxState,
    /// Bytes claimed by the current burst
    in_flight: usize,
}

impl TxQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity),
            state: TxState::Idle,
            in_flight: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Free bytes available to [`enqueue`](Self::enqueue)
    pub fn free(&self) -> usize {
        self.ring.space_avail()
    }

    /// Bytes queued and not yet claimed by a burst
    pub fn pending(&self) -> usize {
        self.ring.data_avail() - self.in_flight
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// Queue all of `data` or nothing
    pub fn enqueue(&mut self, data: &[u8]) -> Result<()> {
        self.ring.write(data)?;
        if !data.is_empty() {
            self.state = TxState::Transmitting;
        }
        Ok(())
    }

    /// Start a drain step with `hw_free` free slots in the hardware FIFO
    pub fn begin_drain(&mut self, hw_free: usize) -> DrainStep {
        if self.in_flight != 0 {
            return DrainStep::Busy;
        }
        let pending = self.pending();
        if pending == 0 {
            self.state = TxState::Idle;
            return DrainStep::Idle;
        }
        let allowed = pending.min(hw_free).min(MAX_BURST);
        if allowed == 0 {
            return DrainStep::Stalled;
        }
        self.in_flight = allowed;
        DrainStep::Send(allowed)
    }

    /// Copy the claimed burst into `out`, returning its length
    pub fn copy_burst(&self, out: &mut [u8]) -> usize {
        let n = self.in_flight.min(out.len());
        self.ring.peek(&mut out[..n])
    }

    /// Commit `sent` bytes of the claimed burst
    ///
    /// Unsent bytes of the burst stay queued for the next step.
    pub fn finish_drain(&mut self, sent: usize) -> TxState {
        self.ring.consume(sent.min(self.in_flight));
        self.in_flight = 0;
        self.state = if self.ring.is_empty() {
            TxState::Idle
        } else {
            TxState::Transmitting
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::UartError;

    /// Run drain steps against a FIFO of `depth` slots that empties between steps
    fn drain_all(queue: &mut TxQueue, depth: usize) -> (alloc::vec::Vec<u8>, usize) {
        let mut wire = alloc::vec::Vec::new();
        let mut steps = 0;
        loop {
            match queue.begin_drain(depth) {
                DrainStep::Idle => return (wire, steps),
                DrainStep::Send(n) => {
                    let mut burst = [0u8; MAX_BURST];
                    assert_eq!(queue.copy_burst(&mut burst), n);
                    wire.extend_from_slice(&burst[..n]);
                    queue.finish_drain(n);
                    steps += 1;
                }
                other => panic!("unexpected step {:?}", other),
            }
        }
    }

    #[test]
    fn test_enqueue_starts_transmitting() {
        let mut queue = TxQueue::new(8);
        assert_eq!(queue.state(), TxState::Idle);
        queue.enqueue(b"").unwrap();
        assert_eq!(queue.state(), TxState::Idle);
        queue.enqueue(b"hi").unwrap();
        assert_eq!(queue.state(), TxState::Transmitting);
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn test_capacity_scenario() {
        let mut queue = TxQueue::new(8);
        queue.enqueue(b"abc").unwrap();
        assert_eq!(queue.free(), 5);
        queue.enqueue(b"defgh").unwrap();
        assert_eq!(queue.free(), 0);
        assert_eq!(queue.enqueue(b"i"), Err(UartError::InsufficientRoom));
        assert_eq!(queue.free(), 0);
        assert_eq!(queue.pending(), 8);
    }

    #[test]
    fn test_burst_bounded_by_fifo() {
        let mut queue = TxQueue::new(16);
        queue.enqueue(b"0123456789").unwrap();
        assert_eq!(queue.begin_drain(4), DrainStep::Send(4));
        assert_eq!(queue.pending(), 6);
        assert_eq!(queue.finish_drain(4), TxState::Transmitting);
        assert_eq!(queue.free(), 10);
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut queue = TxQueue::new(8);
        queue.enqueue(b"abcd").unwrap();
        assert_eq!(queue.begin_drain(2), DrainStep::Send(2));
        assert_eq!(queue.begin_drain(2), DrainStep::Busy);
        // In-flight bytes are still occupying the ring
        assert_eq!(queue.free(), 4);
        queue.finish_drain(2);
        assert_eq!(queue.begin_drain(8), DrainStep::Send(2));
    }

    #[test]
    fn test_stalled_when_fifo_full() {
        let mut queue = TxQueue::new(8);
        queue.enqueue(b"x").unwrap();
        assert_eq!(queue.begin_drain(0), DrainStep::Stalled);
        assert_eq!(queue.state(), TxState::Transmitting);
        assert_eq!(queue.in_flight(), 0);
    }

    #[test]
    fn test_partial_send_keeps_remainder() {
        let mut queue = TxQueue::new(8);
        queue.enqueue(b"abcdef").unwrap();
        assert_eq!(queue.begin_drain(4), DrainStep::Send(4));
        assert_eq!(queue.finish_drain(1), TxState::Transmitting);
        assert_eq!(queue.pending(), 5);

        let mut burst = [0u8; 8];
        assert_eq!(queue.begin_drain(8), DrainStep::Send(5));
        assert_eq!(queue.copy_burst(&mut burst), 5);
        assert_eq!(&burst[..5], b"bcdef");
    }

    #[test]
    fn test_drain_terminates_in_order() {
        let mut queue = TxQueue::new(32);
        queue.enqueue(b"The quick brown fox").unwrap();
        let (wire, steps) = drain_all(&mut queue, 4);
        assert_eq!(&wire[..], b"The quick brown fox");
        assert_eq!(steps, 5);
        assert_eq!(queue.state(), TxState::Idle);
        assert_eq!(queue.free(), 32);
    }

    #[test]
    fn test_drain_across_wrap() {
        let mut queue = TxQueue::new(8);
        queue.enqueue(b"123456").unwrap();
        drain_all(&mut queue, 8);
        queue.enqueue(b"ABCDEFG").unwrap();
        let (wire, _) = drain_all(&mut queue, 3);
        assert_eq!(&wire[..], b"ABCDEFG");
    }
}
