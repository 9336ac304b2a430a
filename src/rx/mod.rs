//! Receive Tracker
//!
//! Turns the position of a circular receive DMA into appends on a
//! [`RingFifo`].
//!
//! # Triggers
//!
//! The DMA writes into a fixed hardware buffer of `hw_len` bytes and wraps
//! to its start without any notion of message boundaries. Three
//! notifications report how far it has got:
//!
//! | Trigger             | Tail position            | Typical cause                       |
//! |---------------------|--------------------------|-------------------------------------|
//! | Idle line           | `hw_len - remaining`     | short burst ended between boundaries |
//! | Half transfer       | `ceil(hw_len / 2)`       | DMA reached the midpoint             |
//! | Transfer complete   | `hw_len`                 | DMA wrapped to the buffer start      |
//!
//! All three share the same arithmetic:
//!
//! ```text
//!   offset = head_ptr % hw_len
//!   copy   = tail - offset
//!
//!   +~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~+
//!   |      offset            tail            |
//!   |         |                |             |
//!   |         v                v             |
//!   | --------******************------------ |
//!   +~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~+
//! ```
//!
//! The starred range is appended to the FIFO and `head_ptr` advances by
//! `copy`. `head_ptr` is a `u64` running total and is only reduced modulo
//! `hw_len` at the point of use.
//!
//! # Late Triggers
//!
//! The USART and DMA interrupts race, so a boundary notification can arrive
//! after an idle trigger already absorbed past it:
//!
//! - An idle report with `remaining == hw_len` at a non-zero offset means
//!   the DMA wrapped exactly. It is taken as `tail = hw_len`, closing the
//!   lap, and the transfer-complete still pending for that wrap copies
//!   nothing. Until it arrives a half-transfer copies nothing either.
//! - A half or complete notification whose boundary lies behind `offset`
//!   copies nothing and leaves `head_ptr` where it is.
//!
//! Both count as [`RxStats::stale`]. A late notification never moves the
//! tracker, so the bytes it would have reported are picked up by the next
//! trigger.
//!
//! # Missed Triggers
//!
//! If an idle report lands behind `offset` the DMA passed a boundary the
//! tracker never heard about. No bytes are copied; `head_ptr` jumps forward
//! to the hardware position and [`RxError::MissedTrigger`] reports how many
//! bytes were skipped. At most one hardware buffer's worth of data is lost
//! and the FIFO is never fed bytes twice.
//!
//! # Contexts
//!
//! Triggers run in interrupt context, [`ReceiveTracker::drain`] in the
//! application. Use [`ReceiveTracker::split`] to give each context its own
//! half.

mod split;

pub use split::{RxDrain, RxTrigger};

use crate::driver::error::{ConfigError, ConfigResult, RxError, RxResult};
use crate::fifo::{Producer, RingFifo};

// =============================================================================
// Events and Results
// =============================================================================

/// A receive-side hardware notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// The line went idle; `remaining` is the DMA remaining-count register
    Idle {
        /// Bytes the DMA has left before wrapping
        remaining: usize,
    },
    /// The DMA reached the midpoint of the hardware buffer
    HalfTransfer,
    /// The DMA reached the end of the hardware buffer and wrapped
    TransferComplete,
}

/// Outcome of a successful trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Absorbed {
    /// Bytes taken from the hardware buffer
    pub copied: usize,
    /// Bytes the FIFO accepted
    pub stored: usize,
}

impl Absorbed {
    /// Bytes dropped because the FIFO was full
    #[inline]
    pub const fn lost(&self) -> usize {
        self.copied - self.stored
    }
}

/// Receive counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Bytes taken from the hardware buffer
    pub absorbed: u64,
    /// Bytes dropped, either on FIFO overflow or skipped on resync
    pub dropped: u64,
    /// Missed-trigger resynchronizations
    pub resyncs: u32,
    /// Half/complete notifications for a boundary already absorbed
    pub stale: u32,
    /// Receive restarts after line errors
    pub restarts: u32,
}

// =============================================================================
// Head Tracking
// =============================================================================

/// Position bookkeeping shared by the tracker and its trigger half
#[derive(Debug)]
pub(crate) struct Head {
    /// Bytes absorbed since reception (re)started
    head_ptr: u64,
    /// Hardware circular buffer size
    hw_len: usize,
    /// An idle report closed the lap; its transfer-complete is still due
    lap_closed: bool,
    stats: RxStats,
}

impl Head {
    const fn new(hw_len: usize) -> Self {
        Self {
            head_ptr: 0,
            hw_len,
            lap_closed: false,
            stats: RxStats {
                absorbed: 0,
                dropped: 0,
                resyncs: 0,
                stale: 0,
                restarts: 0,
            },
        }
    }

    #[inline(always)]
    fn offset(&self) -> usize {
        (self.head_ptr % self.hw_len as u64) as usize
    }

    fn tail_for(&self, event: RxEvent) -> RxResult<usize> {
        match event {
            RxEvent::Idle { remaining } if remaining > self.hw_len => {
                Err(RxError::PositionOutOfRange)
            }
            RxEvent::Idle { remaining } => Ok(self.hw_len - remaining),
            RxEvent::HalfTransfer => Ok(self.hw_len.div_ceil(2)),
            RxEvent::TransferComplete => Ok(self.hw_len),
        }
    }

    pub(crate) fn absorb(
        &mut self,
        producer: &mut Producer<'_>,
        event: RxEvent,
        hw: &[u8],
    ) -> RxResult<Absorbed> {
        if hw.len() != self.hw_len {
            return Err(RxError::BufferMismatch);
        }
        let mut tail = self.tail_for(event)?;
        let offset = self.offset();

        match event {
            RxEvent::TransferComplete if self.lap_closed => {
                self.lap_closed = false;
                return Ok(self.stale(event, offset));
            }
            RxEvent::HalfTransfer if self.lap_closed => {
                return Ok(self.stale(event, offset));
            }
            RxEvent::HalfTransfer | RxEvent::TransferComplete if tail < offset => {
                return Ok(self.stale(event, offset));
            }
            RxEvent::Idle { .. } if tail == 0 && offset != 0 => {
                tail = self.hw_len;
                self.lap_closed = true;
            }
            _ => {}
        }

        if tail < offset {
            let skipped = tail + self.hw_len - offset;
            self.head_ptr += skipped as u64;
            self.stats.resyncs += 1;
            self.stats.dropped += skipped as u64;

            #[cfg(feature = "defmt")]
            defmt::warn!(
                "rx: missed trigger, offset={} tail={} skipped={}",
                offset,
                tail,
                skipped
            );

            return Err(RxError::MissedTrigger { skipped });
        }

        let copied = tail - offset;
        let stored = if copied == 0 {
            0
        } else {
            producer.write(&hw[offset..tail])
        };
        self.head_ptr += copied as u64;
        self.stats.absorbed += copied as u64;
        self.stats.dropped += (copied - stored) as u64;

        #[cfg(feature = "defmt")]
        {
            if stored < copied {
                defmt::warn!("rx: fifo full, dropped {} of {} bytes", copied - stored, copied);
            }
        }

        Ok(Absorbed { copied, stored })
    }

    /// A boundary notification the tracker is already past
    fn stale(&mut self, event: RxEvent, offset: usize) -> Absorbed {
        self.stats.stale += 1;

        #[cfg(feature = "defmt")]
        defmt::debug!("rx: late {}, offset={}", event, offset);
        #[cfg(not(feature = "defmt"))]
        let _ = (event, offset);

        Absorbed::default()
    }

    fn restart(&mut self) {
        self.head_ptr = 0;
        self.lap_closed = false;
        self.stats.restarts += 1;
    }
}

// =============================================================================
// Receive Tracker
// =============================================================================

/// Receive side of one port: a FIFO plus the DMA position tracker.
pub struct ReceiveTracker<'a> {
    fifo: RingFifo<'a>,
    head: Head,
}

impl<'a> ReceiveTracker<'a> {
    /// Create a tracker for a circular DMA buffer of `hw_len` bytes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidConfig`] if `hw_len` is zero.
    pub fn new(fifo: RingFifo<'a>, hw_len: usize) -> ConfigResult<Self> {
        if hw_len == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(Self {
            fifo,
            head: Head::new(hw_len),
        })
    }

    /// Size of the hardware circular buffer
    #[inline]
    pub fn hw_len(&self) -> usize {
        self.head.hw_len
    }

    /// Bytes absorbed since reception (re)started
    #[inline]
    pub fn head_ptr(&self) -> u64 {
        self.head.head_ptr
    }

    /// Receive counters
    #[inline]
    pub fn stats(&self) -> RxStats {
        self.head.stats
    }

    /// Bytes waiting in the FIFO
    #[inline]
    pub fn available(&self) -> usize {
        self.fifo.len()
    }

    /// The line went idle with `remaining` bytes left in the DMA count.
    pub fn on_idle(&mut self, hw: &[u8], remaining: usize) -> RxResult<Absorbed> {
        self.on_event(RxEvent::Idle { remaining }, hw)
    }

    /// The DMA reached the midpoint of `hw`.
    pub fn on_half_transfer(&mut self, hw: &[u8]) -> RxResult<Absorbed> {
        self.on_event(RxEvent::HalfTransfer, hw)
    }

    /// The DMA reached the end of `hw` and wrapped.
    pub fn on_transfer_complete(&mut self, hw: &[u8]) -> RxResult<Absorbed> {
        self.on_event(RxEvent::TransferComplete, hw)
    }

    /// Absorb whatever `event` says is newly available in `hw`.
    pub fn on_event(&mut self, event: RxEvent, hw: &[u8]) -> RxResult<Absorbed> {
        let (mut trigger, _) = self.split();
        trigger.on_event(event, hw)
    }

    /// Reception was restarted from the start of the hardware buffer.
    pub fn restart(&mut self) {
        self.head.restart();
    }

    /// Move up to `dest.len()` received bytes into `dest`.
    #[inline]
    pub fn drain(&mut self, dest: &mut [u8]) -> usize {
        self.fifo.read(dest)
    }

    /// Split into the interrupt-side trigger half and the application-side
    /// drain half.
    pub fn split(&mut self) -> (RxTrigger<'_>, RxDrain<'_>) {
        let (producer, consumer) = self.fifo.split();
        (
            RxTrigger::new(producer, &mut self.head),
            RxDrain::new(consumer),
        )
    }
}

impl core::fmt::Debug for ReceiveTracker<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReceiveTracker")
            .field("fifo", &self.fifo)
            .field("head", &self.head)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::FifoMode;

    fn hw_pattern<const N: usize>() -> [u8; N] {
        core::array::from_fn(|i| i as u8)
    }

    fn drain_all(rx: &mut ReceiveTracker<'_>) -> ([u8; 256], usize) {
        let mut out = [0u8; 256];
        let n = rx.drain(&mut out);
        (out, n)
    }

    #[test]
    fn new_rejects_zero_hw_len() {
        let mut storage = [0u8; 16];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        assert_eq!(
            ReceiveTracker::new(fifo, 0).unwrap_err(),
            ConfigError::InvalidConfig
        );
    }

    #[test]
    fn idle_duplicate_then_advance() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        assert_eq!(
            rx.on_idle(&hw, 70),
            Ok(Absorbed { copied: 30, stored: 30 })
        );
        // Duplicate report, hardware did not move
        assert_eq!(rx.on_idle(&hw, 70), Ok(Absorbed { copied: 0, stored: 0 }));
        assert_eq!(
            rx.on_idle(&hw, 30),
            Ok(Absorbed { copied: 40, stored: 40 })
        );
        assert_eq!(rx.head_ptr(), 70);

        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 70);
        assert_eq!(&out[..70], &hw[..70]);
    }

    #[test]
    fn half_then_full_then_wrap() {
        let hw = hw_pattern::<10>();
        let mut storage = [0u8; 64];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 10).unwrap();

        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 5);
        assert_eq!(rx.on_transfer_complete(&hw).unwrap().copied, 5);
        assert_eq!(rx.head_ptr(), 10);

        // Second lap: idle at 3, then half, then full
        assert_eq!(rx.on_idle(&hw, 7).unwrap().copied, 3);
        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 2);
        assert_eq!(rx.on_transfer_complete(&hw).unwrap().copied, 5);
        assert_eq!(rx.head_ptr(), 20);
        assert_eq!(rx.available(), 20);
    }

    #[test]
    fn half_transfer_rounds_up_for_odd_buffers() {
        let hw = hw_pattern::<7>();
        let mut storage = [0u8; 16];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 7).unwrap();

        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 4);
        assert_eq!(rx.on_transfer_complete(&hw).unwrap().copied, 3);
    }

    #[test]
    fn idle_at_half_boundary_makes_half_trigger_empty() {
        let hw = hw_pattern::<8>();
        let mut storage = [0u8; 16];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 8).unwrap();

        assert_eq!(rx.on_idle(&hw, 4).unwrap().copied, 4);
        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 0);
        assert_eq!(rx.stats().absorbed, 4);
    }

    #[test]
    fn missed_trigger_resyncs_without_copy() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        rx.on_idle(&hw, 30).unwrap(); // offset 70
        // DMA wrapped to 10 without a transfer-complete being serviced
        assert_eq!(
            rx.on_idle(&hw, 90),
            Err(RxError::MissedTrigger { skipped: 40 })
        );
        assert_eq!(rx.head_ptr(), 110);
        assert_eq!(rx.available(), 70);

        let stats = rx.stats();
        assert_eq!(stats.resyncs, 1);
        assert_eq!(stats.dropped, 40);

        // Tracking continues from the hardware position
        assert_eq!(rx.on_idle(&hw, 80).unwrap().copied, 10);
        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 80);
        assert_eq!(&out[70..80], &hw[10..20]);
    }

    // =========================================================================
    // Interrupt Ordering Tests
    // =========================================================================

    #[test]
    fn idle_at_exact_wrap_closes_the_lap() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 50);
        // USART idle serviced before the pending transfer-complete
        assert_eq!(
            rx.on_idle(&hw, 100),
            Ok(Absorbed { copied: 50, stored: 50 })
        );
        assert_eq!(rx.head_ptr(), 100);
        assert_eq!(rx.on_transfer_complete(&hw), Ok(Absorbed::default()));
        assert_eq!(rx.head_ptr(), 100);

        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 100);
        assert_eq!(&out[..100], &hw[..]);

        let stats = rx.stats();
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.resyncs, 0);
        assert_eq!(stats.stale, 1);

        // Next lap tracks normally
        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 50);
        assert_eq!(rx.on_transfer_complete(&hw).unwrap().copied, 50);
        assert_eq!(rx.head_ptr(), 200);
    }

    #[test]
    fn late_half_transfer_after_idle_is_ignored() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        assert_eq!(rx.on_idle(&hw, 40).unwrap().copied, 60);
        assert_eq!(rx.on_half_transfer(&hw), Ok(Absorbed::default()));
        assert_eq!(rx.head_ptr(), 60);
        assert_eq!(rx.on_idle(&hw, 30).unwrap().copied, 10);

        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 70);
        assert_eq!(&out[..70], &hw[..70]);

        let stats = rx.stats();
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.resyncs, 0);
        assert_eq!(stats.stale, 1);
    }

    #[test]
    fn late_half_and_complete_after_lap_close() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        assert_eq!(rx.on_idle(&hw, 60).unwrap().copied, 40);
        assert_eq!(rx.on_idle(&hw, 100).unwrap().copied, 60);
        // Both DMA flags of the closed lap serviced together
        assert_eq!(rx.on_half_transfer(&hw), Ok(Absorbed::default()));
        assert_eq!(rx.on_transfer_complete(&hw), Ok(Absorbed::default()));
        assert_eq!(rx.on_idle(&hw, 90).unwrap().copied, 10);

        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 110);
        assert_eq!(&out[..100], &hw[..]);
        assert_eq!(&out[100..110], &hw[..10]);
        assert_eq!(rx.stats().stale, 2);
        assert_eq!(rx.stats().dropped, 0);
    }

    #[test]
    fn idle_in_new_lap_before_pending_complete() {
        let hw = hw_pattern::<100>();
        let mut storage = [0u8; 256];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 100).unwrap();

        rx.on_half_transfer(&hw).unwrap();
        rx.on_idle(&hw, 100).unwrap();
        assert_eq!(rx.on_idle(&hw, 80).unwrap().copied, 20);
        assert_eq!(rx.on_transfer_complete(&hw), Ok(Absorbed::default()));
        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 30);

        let (out, n) = drain_all(&mut rx);
        assert_eq!(n, 150);
        assert_eq!(&out[..100], &hw[..]);
        assert_eq!(&out[100..150], &hw[..50]);
    }

    #[test]
    fn idle_with_nothing_new_at_lap_start_copies_nothing() {
        let hw = hw_pattern::<16>();
        let mut storage = [0u8; 64];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 16).unwrap();

        assert_eq!(rx.on_idle(&hw, 16), Ok(Absorbed::default()));
        // No lap was closed, so a real first-lap complete copies everything
        assert_eq!(rx.on_transfer_complete(&hw).unwrap().copied, 16);
        assert_eq!(rx.stats().stale, 0);
    }

    #[test]
    fn restart_forgets_a_closed_lap() {
        let hw = hw_pattern::<16>();
        let mut storage = [0u8; 64];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 16).unwrap();

        rx.on_idle(&hw, 10).unwrap();
        rx.on_idle(&hw, 16).unwrap();
        rx.restart();
        assert_eq!(rx.on_half_transfer(&hw).unwrap().copied, 8);
    }

    #[test]
    fn remaining_above_hw_len_is_rejected() {
        let hw = hw_pattern::<16>();
        let mut storage = [0u8; 16];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 16).unwrap();

        assert_eq!(rx.on_idle(&hw, 17), Err(RxError::PositionOutOfRange));
        assert_eq!(rx.head_ptr(), 0);
        assert_eq!(rx.stats(), RxStats::default());
    }

    #[test]
    fn mismatched_hw_slice_is_rejected() {
        let hw = hw_pattern::<8>();
        let mut storage = [0u8; 16];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 16).unwrap();

        assert_eq!(rx.on_transfer_complete(&hw), Err(RxError::BufferMismatch));
        assert_eq!(rx.head_ptr(), 0);
    }

    #[test]
    fn fifo_overflow_still_advances_head() {
        let hw = hw_pattern::<32>();
        let mut storage = [0u8; 8];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 32).unwrap();

        let absorbed = rx.on_idle(&hw, 20).unwrap();
        assert_eq!(absorbed, Absorbed { copied: 12, stored: 8 });
        assert_eq!(absorbed.lost(), 4);
        assert_eq!(rx.head_ptr(), 12);
        assert_eq!(rx.stats().dropped, 4);

        // Next trigger starts after the dropped bytes, not at them
        let mut out = [0u8; 8];
        rx.drain(&mut out);
        assert_eq!(rx.on_idle(&hw, 18).unwrap().copied, 2);
        assert_eq!(rx.drain(&mut out), 2);
        assert_eq!(&out[..2], &[12, 13]);
    }

    #[test]
    fn restart_realigns_to_buffer_start() {
        let hw = hw_pattern::<16>();
        let mut storage = [0u8; 64];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, 16).unwrap();

        rx.on_idle(&hw, 11).unwrap();
        rx.restart();
        assert_eq!(rx.head_ptr(), 0);
        assert_eq!(rx.stats().restarts, 1);

        assert_eq!(rx.on_idle(&hw, 13).unwrap().copied, 3);
        let mut out = [0u8; 16];
        assert_eq!(rx.drain(&mut out), 8);
        assert_eq!(&out[5..8], &[0, 1, 2]);
    }

    #[test]
    fn every_byte_copied_exactly_once_over_many_laps() {
        const HW: usize = 24;
        let hw: [u8; HW] = hw_pattern();
        let mut storage = [0u8; 1024];
        let fifo = RingFifo::new(&mut storage, FifoMode::Stream).unwrap();
        let mut rx = ReceiveTracker::new(fifo, HW).unwrap();

        let mut expected = 0u64;
        let mut out = [0u8; 1024];
        for lap in 0..20usize {
            let stop = lap % (HW / 2);
            rx.on_idle(&hw, HW - stop).unwrap();
            rx.on_half_transfer(&hw).unwrap();
            rx.on_idle(&hw, HW - (HW / 2 + stop)).unwrap();
            rx.on_transfer_complete(&hw).unwrap();
            expected += HW as u64;

            let n = rx.drain(&mut out);
            assert_eq!(n, HW);
            assert_eq!(&out[..HW], &hw[..]);
        }
        assert_eq!(rx.head_ptr(), expected);
        assert_eq!(rx.stats().dropped, 0);
    }
}
