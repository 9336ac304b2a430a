//! Role halves of a [`TransmitPump`].
//!
//! [`TransmitPump`]: super::TransmitPump

use core::sync::atomic::{AtomicBool, Ordering};

use super::{PumpState, TxState, WriteState, state_of};
use crate::driver::error::IoResult;
use crate::fifo::{Consumer, Producer};
use crate::hal::TxDma;

/// The three roles of a split transmit pump
pub struct TxParts<'t> {
    /// Queues bytes, usually application code
    pub writer: TxWriter<'t>,
    /// Starts transfers, application code or the completion handler
    pub pumper: TxPumper<'t>,
    /// Reopens the gate from the transfer-complete interrupt
    pub done: TxDone<'t>,
}

/// Writer role of a split transmit pump
pub struct TxWriter<'t> {
    producer: Producer<'t>,
    state: &'t mut WriteState,
}

/// Pump role of a split transmit pump
pub struct TxPumper<'t> {
    consumer: Consumer<'t>,
    drain_buf: &'t mut [u8],
    state: &'t mut PumpState,
    gate: &'t AtomicBool,
}

/// Completion role of a split transmit pump
#[derive(Clone, Copy)]
pub struct TxDone<'t> {
    gate: &'t AtomicBool,
}

impl<'t> TxWriter<'t> {
    pub(super) fn new(producer: Producer<'t>, state: &'t mut WriteState) -> Self {
        Self { producer, state }
    }

    /// Queue bytes for transmission, returning how many were accepted.
    pub fn enqueue(&mut self, data: &[u8]) -> usize {
        let stored = self.producer.write(data);
        self.state.record(data.len(), stored);
        stored
    }

    /// Bytes that can be queued right now
    #[inline]
    pub fn free(&self) -> usize {
        self.producer.free()
    }
}

impl<'t> TxPumper<'t> {
    pub(super) fn new(
        consumer: Consumer<'t>,
        drain_buf: &'t mut [u8],
        state: &'t mut PumpState,
        gate: &'t AtomicBool,
    ) -> Self {
        Self {
            consumer,
            drain_buf,
            state,
            gate,
        }
    }

    /// Start the next transfer if the gate is open and bytes are waiting.
    pub fn pump<D: TxDma + ?Sized>(&mut self, dma: &mut D) -> IoResult<usize> {
        self.state
            .pump(&mut self.consumer, self.drain_buf, self.gate, dma)
    }

    /// Current transmit state
    #[inline]
    pub fn state(&self) -> TxState {
        state_of(self.gate)
    }

    /// Length of the transfer in flight, `0` when idle
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.state.in_flight(self.gate)
    }

    /// Bytes still queued in the FIFO
    #[inline]
    pub fn queued(&self) -> usize {
        self.consumer.len()
    }
}

impl<'t> TxDone<'t> {
    pub(super) fn new(gate: &'t AtomicBool) -> Self {
        Self { gate }
    }

    /// The running transfer finished; reopen the gate.
    #[inline]
    pub fn on_transfer_complete(&self) {
        self.gate.store(true, Ordering::Release);
    }
}
