// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! UART Instance
//!
//! Driver state of one configured unit: its register file, FIFO depths and
//! the transmit and receive queues. This is where the pure queue steps meet
//! the hardware.
//!
//! Every method that touches a queue or the control register does so inside
//! [`lock_masked`], which masks the unit's interrupt line. Hardware spin
//! waits happen with the line unmasked.

use spin::Mutex;

use super::regs::{Control, LineConfig, Status, UartRegisters};
use super::rx::RxQueue;
use super::tx::{DrainStep, TxQueue, TxState, MAX_BURST};
use crate::config::{Clocks, UartConfig, UnitId};
use crate::dev::interrupt::{InterruptController, IrqEvent};
use crate::err::{Result, UartError};
use crate::sync::{lock_masked, spin_until};

/// Driver state of one configured UART unit
pub struct UartInstance<R> {
    unit: UnitId,
    config: UartConfig,
    regs: R,
    tx_fifo_depth: usize,
    rx_fifo_depth: usize,
    tx: Mutex<TxQueue>,
    rx: Mutex<RxQueue>,
}

impl<R: UartRegisters> UartInstance<R> {
    /// Program the hardware and allocate the queues
    ///
    /// Leaves the receive-ready and overrun interrupts armed and the
    /// directions selected by `config.mode` enabled.
    pub(crate) fn new(config: &UartConfig, regs: R, clocks: &Clocks) -> Result<Self> {
        let (unit, divisor) = config.validate(clocks)?;

        regs.modify_control(|c| c - (Control::TX_ENABLE | Control::RX_ENABLE));
        regs.configure_line(&LineConfig {
            divisor,
            parity: config.parity,
            data_bits: config.data_bits,
        });
        regs.reset_fifos();
        let tx_fifo_depth = regs.tx_fifo_depth();
        let rx_fifo_depth = regs.rx_fifo_depth();

        let mut control = Control::RX_READY_IRQ | Control::OVERRUN_IRQ;
        if config.mode.transmits() {
            control |= Control::TX_ENABLE;
        }
        if config.mode.receives() {
            control |= Control::RX_ENABLE;
        }
        regs.set_control(control);

        log_debug!(
            "UART{}: sbr={} brfa={} fifo tx={} rx={}",
            unit.raw(),
            divisor.sbr,
            divisor.fine_adjust,
            tx_fifo_depth,
            rx_fifo_depth
        );

        Ok(Self {
            unit,
            config: *config,
            regs,
            tx_fifo_depth,
            rx_fifo_depth,
            tx: Mutex::new(TxQueue::new(config.tx_capacity())),
            rx: Mutex::new(RxQueue::new(config.rx_capacity())),
        })
    }

    /// Disable the unit's directions and interrupt sources
    pub(crate) fn shutdown(&self) {
        self.regs.set_control(Control::empty());
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// (transmit, receive) hardware FIFO depths
    pub fn fifo_depths(&self) -> (usize, usize) {
        (self.tx_fifo_depth, self.rx_fifo_depth)
    }

    // ========================================================================
    // Transmit
    // ========================================================================

    /// Queue `data` and run one drain step
    pub fn write_data<I: InterruptController + ?Sized>(&self, irq: &I, data: &[u8]) -> Result<()> {
        if !self.config.mode.transmits() {
            return Err(UartError::NotTransmitter);
        }
        {
            let mut tx = lock_masked(&self.tx, irq, self.unit);
            if let Err(err) = tx.enqueue(data) {
                log_warn!(
                    "UART{}: write of {} bytes rejected, {} free",
                    self.unit.raw(),
                    data.len(),
                    tx.free()
                );
                return Err(err);
            }
        }
        self.drain_step(irq);
        Ok(())
    }

    /// Move queued bytes into the hardware FIFO, up to its free space
    ///
    /// Arms the send interrupt while bytes remain queued and disables it
    /// once the queue is empty. A step that finds another context's burst
    /// in flight disables it too, leaving the decision to that burst's
    /// commit.
    pub fn drain_step<I: InterruptController + ?Sized>(&self, irq: &I) -> TxState {
        let hw_free = self.tx_fifo_depth.saturating_sub(self.regs.tx_fifo_count());
        let mut burst = [0u8; MAX_BURST];

        let len = {
            let mut tx = lock_masked(&self.tx, irq, self.unit);
            match tx.begin_drain(hw_free) {
                DrainStep::Idle => {
                    self.set_send_irq(false);
                    return TxState::Idle;
                }
                DrainStep::Busy => {
                    // The send flag is level-triggered; the burst owner
                    // re-arms on commit if bytes remain
                    self.set_send_irq(false);
                    return TxState::Transmitting;
                }
                DrainStep::Stalled => {
                    self.set_send_irq(true);
                    return TxState::Transmitting;
                }
                DrainStep::Send(len) => tx.copy_burst(&mut burst[..len]),
            }
        };

        let mut sent = 0;
        for &byte in &burst[..len] {
            if !spin_until(|| self.regs.status().contains(Status::TX_EMPTY)) {
                log_warn!(
                    "UART{}: transmitter stuck, {} of {} bytes sent",
                    self.unit.raw(),
                    sent,
                    len
                );
                break;
            }
            self.regs.write_data(byte);
            sent += 1;
        }

        let mut tx = lock_masked(&self.tx, irq, self.unit);
        let state = tx.finish_drain(sent);
        self.set_send_irq(state == TxState::Transmitting);
        state
    }

    /// Free bytes in the transmit queue
    pub fn tx_free<I: InterruptController + ?Sized>(&self, irq: &I) -> usize {
        lock_masked(&self.tx, irq, self.unit).free()
    }

    /// Bytes queued and not yet handed to the hardware
    pub fn tx_pending<I: InterruptController + ?Sized>(&self, irq: &I) -> usize {
        let tx = lock_masked(&self.tx, irq, self.unit);
        tx.pending() + tx.in_flight()
    }

    pub fn tx_state<I: InterruptController + ?Sized>(&self, irq: &I) -> TxState {
        lock_masked(&self.tx, irq, self.unit).state()
    }

    /// Callers hold the unit's critical section
    fn set_send_irq(&self, armed: bool) {
        self.regs.modify_control(|c| {
            if armed {
                c | Control::TX_READY_IRQ
            } else {
                c - Control::TX_READY_IRQ
            }
        });
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Move one byte from the data register into the receive queue
    fn fill<I: InterruptController + ?Sized>(&self, irq: &I) {
        let byte = self.regs.read_data();
        let mut rx = lock_masked(&self.rx, irq, self.unit);
        if !rx.fill(byte) {
            log_trace!("UART{}: receive queue full, byte dropped", self.unit.raw());
        }
    }

    /// Clear the hardware overrun and record it
    fn overrun<I: InterruptController + ?Sized>(&self, irq: &I) {
        let _ = self.regs.read_data();
        lock_masked(&self.rx, irq, self.unit).mark_overrun();
        log_trace!("UART{}: receive overrun", self.unit.raw());
    }

    /// Move buffered received bytes into `out`
    pub fn read_data<I: InterruptController + ?Sized>(&self, irq: &I, out: &mut [u8]) -> usize {
        lock_masked(&self.rx, irq, self.unit).read(out)
    }

    pub fn has_new_data<I: InterruptController + ?Sized>(&self, irq: &I) -> bool {
        lock_masked(&self.rx, irq, self.unit).has_new_data()
    }

    /// Read and clear the overrun indicator
    pub fn take_overrun<I: InterruptController + ?Sized>(&self, irq: &I) -> bool {
        lock_masked(&self.rx, irq, self.unit).take_overrun()
    }

    /// Bytes dropped because the receive queue was full
    pub fn rx_dropped<I: InterruptController + ?Sized>(&self, irq: &I) -> usize {
        lock_masked(&self.rx, irq, self.unit).dropped()
    }

    // ========================================================================
    // Unbuffered
    // ========================================================================

    /// Send one byte directly, bypassing the transmit queue
    pub fn put_char(&self, byte: u8) {
        while !self.regs.status().contains(Status::TX_EMPTY) {
            core::hint::spin_loop();
        }
        self.regs.write_data(byte);
    }

    /// Poll the data register once
    pub fn get_char(&self) -> Option<u8> {
        if self.regs.status().contains(Status::RX_FULL) {
            Some(self.regs.read_data())
        } else {
            None
        }
    }

    // ========================================================================
    // Interrupt Dispatch
    // ========================================================================

    /// Handle one interrupt event
    pub fn on_event<I: InterruptController + ?Sized>(&self, irq: &I, event: IrqEvent) {
        match event {
            IrqEvent::ReadyToSend => {
                self.drain_step(irq);
            }
            IrqEvent::DataReady => self.fill(irq),
            IrqEvent::Overrun => self.overrun(irq),
        }
    }

    /// Decode the status register and handle the pending events
    pub fn service<I: InterruptController + ?Sized>(&self, irq: &I) {
        let status = self.regs.status();
        if status.contains(Status::OVERRUN) {
            self.on_event(irq, IrqEvent::Overrun);
        } else if status.contains(Status::RX_FULL) {
            self.on_event(irq, IrqEvent::DataReady);
        }

        if status.contains(Status::TX_EMPTY)
            && self.regs.control().contains(Control::TX_READY_IRQ)
        {
            self.on_event(irq, IrqEvent::ReadyToSend);
        }
    }
}
