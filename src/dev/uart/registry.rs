// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! UART Registry
//!
//! Fixed table of per-unit driver state, indexed by unit id, and the public
//! driver API. A [`UartHandle`] is the validated unit id of a configured
//! unit.
//!
//! # Locking
//!
//! Each slot is a `spin::RwLock`. `init` and `delete` take the write side
//! with the unit's interrupt line masked; every other operation, including
//! interrupt dispatch, takes the read side, so an interrupt handler never
//! waits on the foreground code it preempted.

use spin::RwLock;

use super::instance::UartInstance;
use super::regs::UartRegisters;
use super::tx::TxState;
use crate::config::{Clocks, UartConfig, UnitId, MAX_UART_UNITS};
use crate::dev::interrupt::{InterruptController, IrqEvent, IrqEvents};
use crate::err::{Result, UartError};
use crate::sync::CriticalSection;

/// Raw value standing in for a handle when `init` fails
pub const INVALID_HANDLE: i16 = -1;

/// Handle of a configured UART unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UartHandle(UnitId);

impl UartHandle {
    /// Unit id behind the handle
    pub const fn unit(self) -> UnitId {
        self.0
    }

    /// Raw handle value (the unit number)
    pub const fn raw(self) -> i16 {
        self.0.raw() as i16
    }

    /// Rebuild a handle from its raw value
    pub fn from_raw(raw: i16) -> Option<Self> {
        u8::try_from(raw).ok().and_then(UnitId::new).map(Self)
    }
}

/// Table of UART units and the driver entry points
pub struct UartRegistry<R, I> {
    slots: [RwLock<Option<UartInstance<R>>>; MAX_UART_UNITS],
    irq: I,
    clocks: Clocks,
}

impl<R: UartRegisters, I: InterruptController> UartRegistry<R, I> {
    const EMPTY_SLOT: RwLock<Option<UartInstance<R>>> = RwLock::new(None);

    /// Create an empty registry
    pub const fn new(irq: I, clocks: Clocks) -> Self {
        Self {
            slots: [Self::EMPTY_SLOT; MAX_UART_UNITS],
            irq,
            clocks,
        }
    }

    /// Configure a unit
    ///
    /// Fails with [`UartError::UnitBusy`] if the unit is already configured;
    /// the existing instance is left untouched.
    pub fn init(&self, config: &UartConfig, regs: R) -> Result<UartHandle> {
        let unit = config.unit_id()?;
        {
            let _cs = CriticalSection::enter(&self.irq, unit);
            let mut slot = self.slots[unit.index()].write();
            if slot.is_some() {
                log_warn!("UART{}: init rejected, unit busy", unit.raw());
                return Err(UartError::UnitBusy);
            }
            let instance = UartInstance::new(config, regs, &self.clocks).map_err(|err| {
                log_error!("UART{}: init failed: {}", unit.raw(), err);
                err
            })?;
            *slot = Some(instance);
        }
        self.irq.attach(unit, IrqEvents::all());

        log_info!(
            "UART{}: {:?} at {} baud, buffers rx={} tx={}",
            unit.raw(),
            config.mode,
            config.baud_rate,
            config.rx_capacity(),
            config.tx_capacity()
        );
        Ok(UartHandle(unit))
    }

    /// Release a unit
    ///
    /// The handle must not be used afterwards; later calls with it fail
    /// with [`UartError::NotConfigured`] until the unit is configured again.
    pub fn delete(&self, handle: UartHandle) {
        let unit = handle.unit();
        self.irq.detach(unit);
        let instance = {
            let _cs = CriticalSection::enter(&self.irq, unit);
            self.slots[unit.index()].write().take()
        };
        if let Some(instance) = instance {
            instance.shutdown();
            log_info!("UART{}: deleted", unit.raw());
        }
    }

    /// Whether `unit` has a configured instance
    pub fn is_configured(&self, unit: UnitId) -> bool {
        self.slots[unit.index()].read().is_some()
    }

    fn with<T>(&self, handle: UartHandle, f: impl FnOnce(&UartInstance<R>) -> Result<T>) -> Result<T> {
        let slot = self.slots[handle.unit().index()].read();
        match slot.as_ref() {
            Some(instance) => f(instance),
            None => Err(UartError::NotConfigured),
        }
    }

    // ========================================================================
    // Buffered I/O
    // ========================================================================

    /// Queue `data` for transmission
    ///
    /// All or nothing: if the transmit buffer lacks room for the whole of
    /// `data`, fails with [`UartError::InsufficientRoom`] and queues nothing.
    /// Never waits for room.
    pub fn write_data(&self, handle: UartHandle, data: &[u8]) -> Result<()> {
        self.with(handle, |uart| uart.write_data(&self.irq, data))
    }

    /// Move received bytes into `out`, returning how many were copied
    pub fn read_data(&self, handle: UartHandle, out: &mut [u8]) -> Result<usize> {
        self.with(handle, |uart| Ok(uart.read_data(&self.irq, out)))
    }

    /// Whether bytes arrived since the receive queue was last emptied
    pub fn has_new_data(&self, handle: UartHandle) -> Result<bool> {
        self.with(handle, |uart| Ok(uart.has_new_data(&self.irq)))
    }

    /// Read and clear the overrun indicator
    pub fn take_overrun(&self, handle: UartHandle) -> Result<bool> {
        self.with(handle, |uart| Ok(uart.take_overrun(&self.irq)))
    }

    /// Fail with [`UartError::Overrun`] if an overrun was recorded, clearing it
    pub fn check_overrun(&self, handle: UartHandle) -> Result<()> {
        if self.take_overrun(handle)? {
            Err(UartError::Overrun)
        } else {
            Ok(())
        }
    }

    /// Received bytes dropped because the receive queue was full
    pub fn rx_dropped(&self, handle: UartHandle) -> Result<usize> {
        self.with(handle, |uart| Ok(uart.rx_dropped(&self.irq)))
    }

    /// Free bytes in the transmit queue
    pub fn tx_free(&self, handle: UartHandle) -> Result<usize> {
        self.with(handle, |uart| Ok(uart.tx_free(&self.irq)))
    }

    /// Queued bytes not yet handed to the hardware
    pub fn tx_pending(&self, handle: UartHandle) -> Result<usize> {
        self.with(handle, |uart| Ok(uart.tx_pending(&self.irq)))
    }

    pub fn tx_state(&self, handle: UartHandle) -> Result<TxState> {
        self.with(handle, |uart| Ok(uart.tx_state(&self.irq)))
    }

    /// (transmit, receive) hardware FIFO depths
    pub fn fifo_depths(&self, handle: UartHandle) -> Result<(usize, usize)> {
        self.with(handle, |uart| Ok(uart.fifo_depths()))
    }

    pub fn config(&self, handle: UartHandle) -> Result<UartConfig> {
        self.with(handle, |uart| Ok(*uart.config()))
    }

    // ========================================================================
    // Unbuffered I/O
    // ========================================================================

    /// Send one byte directly, spinning until the data register is free
    ///
    /// Bypasses the transmit queue; do not interleave with buffered writes
    /// on the same unit without external coordination.
    pub fn put_char(&self, handle: UartHandle, byte: u8) -> Result<()> {
        self.with(handle, |uart| {
            uart.put_char(byte);
            Ok(())
        })
    }

    /// Poll the data register once; `None` if no byte is waiting
    pub fn get_char(&self, handle: UartHandle) -> Result<Option<u8>> {
        self.with(handle, |uart| Ok(uart.get_char()))
    }

    // ========================================================================
    // Interrupt Entry Points
    // ========================================================================

    /// Handle `event` for `unit`
    ///
    /// Called from interrupt context. Events for unconfigured units are
    /// ignored.
    pub fn on_event(&self, unit: UnitId, event: IrqEvent) {
        let slot = self.slots[unit.index()].read();
        match slot.as_ref() {
            Some(uart) => uart.on_event(&self.irq, event),
            None => log_trace!("UART{}: {:?} on unconfigured unit", unit.raw(), event),
        }
    }

    /// Decode the status register of `unit` and handle what is pending
    ///
    /// Entry point for platforms with one vector per unit.
    pub fn service(&self, unit: UnitId) {
        let slot = self.slots[unit.index()].read();
        if let Some(uart) = slot.as_ref() {
            uart.service(&self.irq);
        }
    }
}
