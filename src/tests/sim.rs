// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Simulated Hardware
//!
//! Deterministic stand-ins for a UART register file and an interrupt
//! controller. Nothing moves on its own: tests shift transmitted bytes out
//! of the FIFO and inject received bytes explicitly.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use spin::{Mutex, Once};

use crate::config::{UnitId, MAX_UART_UNITS};
use crate::dev::interrupt::{InterruptController, IrqEvents};
use crate::dev::uart::{Control, LineConfig, Status, UartRegisters, UartRegistry};

// ============================================================================
// Register File
// ============================================================================

struct SimState {
    control: Control,
    line: Option<LineConfig>,
    tx_depth: usize,
    rx_depth: usize,
    tx_fifo: VecDeque<u8>,
    /// Bytes shifted out of the transmitter
    wire: Vec<u8>,
    /// Receive data register
    rx_data: Option<u8>,
    overrun: bool,
    data_reads: usize,
    fifo_resets: usize,
    /// Transmitter never reports an empty data register
    stuck: bool,
}

/// Simulated UART register file
pub struct SimUart {
    state: Mutex<SimState>,
}

impl SimUart {
    pub fn new(tx_depth: usize, rx_depth: usize) -> Self {
        Self {
            state: Mutex::new(SimState {
                control: Control::empty(),
                line: None,
                tx_depth,
                rx_depth,
                tx_fifo: VecDeque::new(),
                wire: Vec::new(),
                rx_data: None,
                overrun: false,
                data_reads: 0,
                fifo_resets: 0,
                stuck: false,
            }),
        }
    }

    /// Shift up to `n` bytes from the transmit FIFO onto the wire
    pub fn shift_out(&self, n: usize) {
        let mut state = self.state.lock();
        for _ in 0..n {
            match state.tx_fifo.pop_front() {
                Some(byte) => state.wire.push(byte),
                None => break,
            }
        }
    }

    pub fn shift_all(&self) {
        self.shift_out(usize::MAX);
    }

    pub fn wire(&self) -> Vec<u8> {
        self.state.lock().wire.clone()
    }

    pub fn tx_fifo(&self) -> Vec<u8> {
        self.state.lock().tx_fifo.iter().copied().collect()
    }

    /// A byte arrives on the receiver
    ///
    /// If the data register is still full, the byte is lost and the
    /// overrun flag is raised.
    pub fn receive(&self, byte: u8) {
        let mut state = self.state.lock();
        if state.rx_data.is_some() {
            state.overrun = true;
        } else {
            state.rx_data = Some(byte);
        }
    }

    pub fn data_reads(&self) -> usize {
        self.state.lock().data_reads
    }

    pub fn fifo_resets(&self) -> usize {
        self.state.lock().fifo_resets
    }

    pub fn line(&self) -> Option<LineConfig> {
        self.state.lock().line
    }

    pub fn set_stuck(&self, stuck: bool) {
        self.state.lock().stuck = stuck;
    }
}

impl UartRegisters for SimUart {
    fn control(&self) -> Control {
        self.state.lock().control
    }

    fn set_control(&self, control: Control) {
        self.state.lock().control = control;
    }

    fn status(&self) -> Status {
        let state = self.state.lock();
        let mut status = Status::empty();
        status.set(
            Status::TX_EMPTY,
            !state.stuck && state.tx_fifo.len() < state.tx_depth,
        );
        status.set(Status::TX_COMPLETE, state.tx_fifo.is_empty());
        status.set(Status::RX_FULL, state.rx_data.is_some());
        status.set(Status::OVERRUN, state.overrun);
        status
    }

    fn read_data(&self) -> u8 {
        let mut state = self.state.lock();
        state.data_reads += 1;
        state.overrun = false;
        state.rx_data.take().unwrap_or(0)
    }

    fn write_data(&self, byte: u8) {
        let mut state = self.state.lock();
        if state.tx_fifo.len() < state.tx_depth {
            state.tx_fifo.push_back(byte);
        }
    }

    fn configure_line(&self, line: &LineConfig) {
        self.state.lock().line = Some(*line);
    }

    fn reset_fifos(&self) {
        let mut state = self.state.lock();
        state.tx_fifo.clear();
        state.rx_data = None;
        state.fifo_resets += 1;
    }

    fn tx_fifo_depth(&self) -> usize {
        self.state.lock().tx_depth
    }

    fn rx_fifo_depth(&self) -> usize {
        self.state.lock().rx_depth
    }

    fn tx_fifo_count(&self) -> usize {
        self.state.lock().tx_fifo.len()
    }
}

// ============================================================================
// Preempting Register File
// ============================================================================

/// Registry type driven by [`PreemptUart`]
pub type PreemptRegistry = UartRegistry<&'static PreemptUart, &'static SimIrq>;

/// Re-entries after which the send interrupt counts as stuck asserted
pub const STORM_LIMIT: usize = 1000;

/// Register file whose send interrupt preempts the foreground
///
/// Models a level-triggered "ready to send" line: whenever foreground code
/// polls the status register while the unit's line is unmasked, the send
/// interrupt is enabled and the data register is empty, the unit's handler
/// runs, and keeps running for as long as that condition holds.
pub struct PreemptUart {
    inner: SimUart,
    irq: &'static SimIrq,
    unit: UnitId,
    registry: Once<&'static PreemptRegistry>,
    in_handler: AtomicBool,
    handler_runs: AtomicUsize,
    storm: AtomicBool,
}

impl PreemptUart {
    pub fn new(inner: SimUart, irq: &'static SimIrq, unit: UnitId) -> Self {
        Self {
            inner,
            irq,
            unit,
            registry: Once::new(),
            in_handler: AtomicBool::new(false),
            handler_runs: AtomicUsize::new(0),
            storm: AtomicBool::new(false),
        }
    }

    /// Route the interrupt to `registry`
    pub fn connect(&self, registry: &'static PreemptRegistry) {
        self.registry.call_once(|| registry);
    }

    pub fn inner(&self) -> &SimUart {
        &self.inner
    }

    pub fn handler_runs(&self) -> usize {
        self.handler_runs.load(Ordering::SeqCst)
    }

    /// Whether the handler hit [`STORM_LIMIT`] without the line deasserting
    pub fn storm(&self) -> bool {
        self.storm.load(Ordering::SeqCst)
    }

    /// Run the handler if the send interrupt is asserted
    pub fn deliver(&self) {
        self.preempt();
    }

    fn send_asserted(&self) -> bool {
        !self.irq.is_masked(self.unit)
            && self.inner.control().contains(Control::TX_READY_IRQ)
            && self.inner.status().contains(Status::TX_EMPTY)
    }

    fn preempt(&self) {
        let Some(registry) = self.registry.get() else {
            return;
        };
        if self.in_handler.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut runs = 0;
        while self.send_asserted() {
            if runs == STORM_LIMIT {
                self.storm.store(true, Ordering::SeqCst);
                break;
            }
            registry.service(self.unit);
            runs += 1;
        }
        self.handler_runs.fetch_add(runs, Ordering::SeqCst);
        self.in_handler.store(false, Ordering::SeqCst);
    }
}

impl UartRegisters for PreemptUart {
    fn control(&self) -> Control {
        self.inner.control()
    }

    fn set_control(&self, control: Control) {
        self.inner.set_control(control)
    }

    fn status(&self) -> Status {
        self.preempt();
        self.inner.status()
    }

    fn read_data(&self) -> u8 {
        self.inner.read_data()
    }

    fn write_data(&self, byte: u8) {
        self.inner.write_data(byte)
    }

    fn configure_line(&self, line: &LineConfig) {
        self.inner.configure_line(line)
    }

    fn reset_fifos(&self) {
        self.inner.reset_fifos()
    }

    fn tx_fifo_depth(&self) -> usize {
        self.inner.tx_fifo_depth()
    }

    fn rx_fifo_depth(&self) -> usize {
        self.inner.rx_fifo_depth()
    }

    fn tx_fifo_count(&self) -> usize {
        self.inner.tx_fifo_count()
    }
}

// ============================================================================
// Interrupt Controller
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct Line {
    attached: Option<IrqEvents>,
    unmasked: bool,
    mask_calls: usize,
}

/// Simulated interrupt controller tracking per-unit line state
pub struct SimIrq {
    lines: Mutex<[Line; MAX_UART_UNITS]>,
}

impl SimIrq {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new([Line::default(); MAX_UART_UNITS]),
        }
    }

    pub fn is_masked(&self, unit: UnitId) -> bool {
        !self.lines.lock()[unit.index()].unmasked
    }

    pub fn attached(&self, unit: UnitId) -> Option<IrqEvents> {
        self.lines.lock()[unit.index()].attached
    }

    pub fn mask_calls(&self, unit: UnitId) -> usize {
        self.lines.lock()[unit.index()].mask_calls
    }
}

impl InterruptController for SimIrq {
    fn attach(&self, unit: UnitId, events: IrqEvents) {
        let mut lines = self.lines.lock();
        let line = &mut lines[unit.index()];
        line.attached = Some(events);
        line.unmasked = true;
    }

    fn detach(&self, unit: UnitId) {
        let mut lines = self.lines.lock();
        let line = &mut lines[unit.index()];
        line.attached = None;
        line.unmasked = false;
    }

    fn mask(&self, unit: UnitId) -> bool {
        let mut lines = self.lines.lock();
        let line = &mut lines[unit.index()];
        line.mask_calls += 1;
        core::mem::replace(&mut line.unmasked, false)
    }

    fn restore(&self, unit: UnitId, was_unmasked: bool) {
        if was_unmasked {
            self.lines.lock()[unit.index()].unmasked = true;
        }
    }
}
