//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the DMA streams and the delay provider, so the
//! transport can be exercised without hardware.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::vec;
use std::vec::Vec;

use crate::driver::error::{IoError, IoResult};
use crate::hal::{RxDma, TxDma};
use crate::rx::RxEvent;

// =============================================================================
// Mock Receive DMA
// =============================================================================

/// Mock circular receive DMA
///
/// Bytes fed in land in the circular buffer exactly as the hardware would
/// write them, and the half/complete notifications the hardware would raise
/// are returned in order.
///
/// # Example
///
/// ```ignore
/// let mut dma = MockRxDma::new(8);
/// let events = dma.feed(b"abcde");
/// assert_eq!(events, [RxEvent::HalfTransfer]);
/// assert_eq!(dma.remaining(), 3);
/// ```
#[derive(Debug)]
pub struct MockRxDma {
    buffer: Vec<u8>,
    /// Next slot the "hardware" writes
    pos: usize,
    /// Restart attempts that will fail before one succeeds
    failing_restarts: u32,
    restart_calls: u32,
}

impl MockRxDma {
    /// Create a stream over a zeroed circular buffer of `len` bytes
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0; len],
            pos: 0,
            failing_restarts: 0,
            restart_calls: 0,
        }
    }

    /// Write `data` into the circular buffer, returning the notifications
    /// raised along the way.
    pub fn feed(&mut self, data: &[u8]) -> Vec<RxEvent> {
        let len = self.buffer.len();
        let half = len.div_ceil(2);
        let mut events = Vec::new();
        for &byte in data {
            self.buffer[self.pos] = byte;
            self.pos += 1;
            if self.pos == half && half != len {
                events.push(RxEvent::HalfTransfer);
            }
            if self.pos == len {
                events.push(RxEvent::TransferComplete);
                self.pos = 0;
            }
        }
        events
    }

    /// The idle-line notification for the current position
    pub fn idle_event(&self) -> RxEvent {
        RxEvent::Idle {
            remaining: self.remaining(),
        }
    }

    /// Make the next `count` restarts fail
    pub fn fail_restarts(&mut self, count: u32) {
        self.failing_restarts = count;
    }

    /// Number of restart attempts, successful or not
    pub fn restart_calls(&self) -> u32 {
        self.restart_calls
    }
}

impl RxDma for MockRxDma {
    fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    fn restart(&mut self) -> IoResult<()> {
        self.restart_calls += 1;
        if self.failing_restarts > 0 {
            self.failing_restarts -= 1;
            return Err(IoError::TransferFailed);
        }
        self.pos = 0;
        Ok(())
    }
}

// =============================================================================
// Mock Transmit DMA
// =============================================================================

/// Mock transmit DMA
///
/// Records a copy of every started transfer for verification.
#[derive(Debug, Default)]
pub struct MockTxDma {
    transfers: Vec<Vec<u8>>,
    /// Starts that will fail before one succeeds
    failing_starts: u32,
}

impl MockTxDma {
    /// Create a new mock transmit stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` starts fail
    pub fn fail_next(&mut self, count: u32) {
        self.failing_starts = count;
    }

    /// Number of transfers started
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Payload of the `index`th transfer
    pub fn transfer(&self, index: usize) -> Option<&[u8]> {
        self.transfers.get(index).map(Vec::as_slice)
    }

    /// Every transferred byte, in order
    pub fn sent(&self) -> Vec<u8> {
        self.transfers.concat()
    }
}

impl TxDma for MockTxDma {
    fn start(&mut self, data: &[u8]) -> IoResult<()> {
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            return Err(IoError::TransferFailed);
        }
        self.transfers.push(data.to_vec());
        Ok(())
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
    /// Number of delay calls
    calls: RefCell<u32>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Number of delay calls
    pub fn calls(&self) -> u32 {
        *self.calls.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
        *self.calls.borrow_mut() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn rx_feed_reports_crossings() {
        let mut dma = MockRxDma::new(8);
        assert_eq!(dma.feed(b"abc"), vec![]);
        assert_eq!(dma.feed(b"d"), vec![RxEvent::HalfTransfer]);
        assert_eq!(dma.remaining(), 4);
        assert_eq!(
            dma.feed(b"efghij"),
            vec![RxEvent::TransferComplete]
        );
        assert_eq!(dma.remaining(), 6);
        assert_eq!(&dma.buffer()[..2], b"ij");
        assert_eq!(dma.idle_event(), RxEvent::Idle { remaining: 6 });
    }

    #[test]
    fn rx_restart_failures() {
        let mut dma = MockRxDma::new(4);
        dma.feed(b"ab");
        dma.fail_restarts(1);
        assert_eq!(dma.restart(), Err(IoError::TransferFailed));
        assert_eq!(dma.remaining(), 2);
        assert_eq!(dma.restart(), Ok(()));
        assert_eq!(dma.remaining(), 4);
        assert_eq!(dma.restart_calls(), 2);
    }

    #[test]
    fn tx_records_transfers() {
        let mut dma = MockTxDma::new();
        dma.fail_next(1);
        assert!(dma.start(b"no").is_err());
        dma.start(b"ab").unwrap();
        dma.start(b"c").unwrap();
        assert_eq!(dma.transfer_count(), 2);
        assert_eq!(dma.transfer(1), Some(&b"c"[..]));
        assert_eq!(dma.sent(), b"abc");
    }

    #[test]
    fn delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_us(10);
        assert_eq!(delay.total_us(), 20);
        assert_eq!(delay.calls(), 2);
    }
}
