//! Transmit Pump
//!
//! Moves queued bytes through one DMA transfer at a time.
//!
//! # State Machine
//!
//! ```text
//!            pump() with queued bytes
//!   +------+ -----------------------> +--------------+
//!   | Idle |                          | Transferring |
//!   +------+ <----------------------- +--------------+
//!             on_transfer_complete()
//! ```
//!
//! The gate is open in `Idle` and closed in `Transferring`. `pump()` while
//! transferring, or with nothing queued, does nothing. The drain buffer is
//! refilled only while the gate is open, so the DMA never sees it change
//! under a running transfer.
//!
//! # Start Failures
//!
//! If [`TxDma::start`] fails the drained bytes stay in the drain buffer as
//! pending and the gate reopens. The next `pump()` retries them before
//! reading anything new from the FIFO.

mod split;

pub use split::{TxDone, TxParts, TxPumper, TxWriter};

use core::sync::atomic::{AtomicBool, Ordering};

use crate::driver::error::{ConfigError, ConfigResult, IoResult};
use crate::fifo::{Consumer, RingFifo};
use crate::hal::TxDma;
use crate::internal::constants::MAX_DMA_TRANSFER;

// =============================================================================
// State and Counters
// =============================================================================

/// Transmit side state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    /// Gate open, the next `pump()` may start a transfer
    Idle,
    /// A transfer is in flight
    Transferring,
}

/// Transmit counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    /// Bytes accepted by the FIFO
    pub enqueued: u64,
    /// Bytes rejected because the FIFO was full
    pub dropped: u64,
    /// Transfers started
    pub transfers: u32,
    /// `TxDma::start` calls that failed
    pub start_failures: u32,
}

/// Counters owned by the writer role
#[derive(Debug, Default)]
pub(crate) struct WriteState {
    enqueued: u64,
    dropped: u64,
}

/// Drain buffer bookkeeping owned by the pump role
#[derive(Debug, Default)]
pub(crate) struct PumpState {
    /// Bytes drained but not yet handed to a started transfer
    pending: usize,
    /// Length of the last started transfer
    in_flight: usize,
    transfers: u32,
    start_failures: u32,
}

impl WriteState {
    fn record(&mut self, offered: usize, stored: usize) {
        self.enqueued += stored as u64;
        self.dropped += (offered - stored) as u64;

        #[cfg(feature = "defmt")]
        {
            if stored < offered {
                defmt::warn!("tx: fifo full, dropped {} of {} bytes", offered - stored, offered);
            }
        }
    }
}

impl PumpState {
    /// One pump step over the parts of a transmit pump.
    fn pump<D: TxDma + ?Sized>(
        &mut self,
        consumer: &mut Consumer<'_>,
        drain_buf: &mut [u8],
        gate: &AtomicBool,
        dma: &mut D,
    ) -> IoResult<usize> {
        if !gate.load(Ordering::Acquire) {
            return Ok(0);
        }
        if self.pending == 0 {
            self.pending = consumer.read(drain_buf);
            if self.pending == 0 {
                return Ok(0);
            }
        }

        let len = self.pending;
        // Closed before starting: completion may fire before `start` returns.
        gate.store(false, Ordering::Release);
        match dma.start(&drain_buf[..len]) {
            Ok(()) => {
                self.pending = 0;
                self.in_flight = len;
                self.transfers += 1;
                Ok(len)
            }
            Err(e) => {
                self.start_failures += 1;
                gate.store(true, Ordering::Release);

                #[cfg(feature = "defmt")]
                defmt::warn!("tx: start failed ({}), {} bytes pending", e, len);

                Err(e)
            }
        }
    }

    fn in_flight(&self, gate: &AtomicBool) -> usize {
        if gate.load(Ordering::Acquire) {
            0
        } else {
            self.in_flight
        }
    }
}

fn state_of(gate: &AtomicBool) -> TxState {
    if gate.load(Ordering::Acquire) {
        TxState::Idle
    } else {
        TxState::Transferring
    }
}

// =============================================================================
// Transmit Pump
// =============================================================================

/// Transmit side of one port: a FIFO, a drain buffer and the gate.
pub struct TransmitPump<'a> {
    fifo: RingFifo<'a>,
    drain_buf: &'a mut [u8],
    writes: WriteState,
    pumps: PumpState,
    /// Open (true) while no transfer is in flight
    gate: AtomicBool,
}

impl<'a> TransmitPump<'a> {
    /// Create a pump draining `fifo` through `drain_buf`.
    ///
    /// Each transfer moves at most `drain_buf.len()` bytes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyStorage`] if `drain_buf` is empty
    /// - [`ConfigError::InvalidConfig`] if `drain_buf` is longer than one
    ///   DMA transfer can move
    pub fn new(fifo: RingFifo<'a>, drain_buf: &'a mut [u8]) -> ConfigResult<Self> {
        if drain_buf.is_empty() {
            return Err(ConfigError::EmptyStorage);
        }
        if drain_buf.len() > MAX_DMA_TRANSFER {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(Self {
            fifo,
            drain_buf,
            writes: WriteState::default(),
            pumps: PumpState::default(),
            gate: AtomicBool::new(true),
        })
    }

    /// Queue bytes for transmission, returning how many were accepted.
    pub fn enqueue(&mut self, data: &[u8]) -> usize {
        let stored = self.fifo.write(data);
        self.writes.record(data.len(), stored);
        stored
    }

    /// Start the next transfer if the gate is open and bytes are waiting.
    ///
    /// Returns the transfer length, or `0` when nothing was started.
    ///
    /// # Errors
    ///
    /// Whatever [`TxDma::start`] reports. The bytes stay pending and are
    /// retried by the next call.
    pub fn pump<D: TxDma + ?Sized>(&mut self, dma: &mut D) -> IoResult<usize> {
        let (_, mut consumer) = self.fifo.split();
        self.pumps
            .pump(&mut consumer, self.drain_buf, &self.gate, dma)
    }

    /// The running transfer finished; reopen the gate.
    #[inline]
    pub fn on_transfer_complete(&self) {
        self.gate.store(true, Ordering::Release);
    }

    /// Check if no transfer is in flight
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.gate.load(Ordering::Acquire)
    }

    /// Current transmit state
    #[inline]
    pub fn state(&self) -> TxState {
        state_of(&self.gate)
    }

    /// Length of the transfer in flight, `0` when idle
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.pumps.in_flight(&self.gate)
    }

    /// Bytes drained from the FIFO whose transfer has not started yet
    #[inline]
    pub fn pending(&self) -> usize {
        self.pumps.pending
    }

    /// Bytes still queued in the FIFO
    #[inline]
    pub fn queued(&self) -> usize {
        self.fifo.len()
    }

    /// Size of the drain buffer, the largest single transfer
    #[inline]
    pub fn drain_size(&self) -> usize {
        self.drain_buf.len()
    }

    /// Transmit counters
    pub fn stats(&self) -> TxStats {
        TxStats {
            enqueued: self.writes.enqueued,
            dropped: self.writes.dropped,
            transfers: self.pumps.transfers,
            start_failures: self.pumps.start_failures,
        }
    }

    /// Split into the writer, pump and completion roles.
    pub fn split(&mut self) -> TxParts<'_> {
        let (producer, consumer) = self.fifo.split();
        TxParts {
            writer: TxWriter::new(producer, &mut self.writes),
            pumper: TxPumper::new(consumer, self.drain_buf, &mut self.pumps, &self.gate),
            done: TxDone::new(&self.gate),
        }
    }
}

impl core::fmt::Debug for TransmitPump<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransmitPump")
            .field("fifo", &self.fifo)
            .field("drain_size", &self.drain_buf.len())
            .field("state", &self.state())
            .field("pending", &self.pumps.pending)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
