//! Interrupt-side and application-side halves of a [`ReceiveTracker`].
//!
//! [`ReceiveTracker`]: super::ReceiveTracker

use super::{Absorbed, Head, RxEvent, RxStats};
use crate::driver::error::RxResult;
use crate::fifo::{Consumer, Producer};

/// Trigger half of a split receive tracker.
///
/// Owned by the interrupt handlers of one port. The handlers must not
/// preempt each other.
pub struct RxTrigger<'t> {
    producer: Producer<'t>,
    head: &'t mut Head,
}

/// Drain half of a split receive tracker.
pub struct RxDrain<'t> {
    consumer: Consumer<'t>,
}

impl<'t> RxTrigger<'t> {
    pub(super) fn new(producer: Producer<'t>, head: &'t mut Head) -> Self {
        Self { producer, head }
    }

    /// The line went idle with `remaining` bytes left in the DMA count.
    #[inline]
    pub fn on_idle(&mut self, hw: &[u8], remaining: usize) -> RxResult<Absorbed> {
        self.on_event(RxEvent::Idle { remaining }, hw)
    }

    /// The DMA reached the midpoint of `hw`.
    #[inline]
    pub fn on_half_transfer(&mut self, hw: &[u8]) -> RxResult<Absorbed> {
        self.on_event(RxEvent::HalfTransfer, hw)
    }

    /// The DMA reached the end of `hw` and wrapped.
    #[inline]
    pub fn on_transfer_complete(&mut self, hw: &[u8]) -> RxResult<Absorbed> {
        self.on_event(RxEvent::TransferComplete, hw)
    }

    /// Absorb whatever `event` says is newly available in `hw`.
    pub fn on_event(&mut self, event: RxEvent, hw: &[u8]) -> RxResult<Absorbed> {
        self.head.absorb(&mut self.producer, event, hw)
    }

    /// Reception was restarted from the start of the hardware buffer.
    pub fn restart(&mut self) {
        self.head.restart();
    }

    /// Bytes absorbed since reception (re)started
    pub fn head_ptr(&self) -> u64 {
        self.head.head_ptr
    }

    /// Receive counters
    pub fn stats(&self) -> RxStats {
        self.head.stats
    }
}

impl<'t> RxDrain<'t> {
    pub(super) fn new(consumer: Consumer<'t>) -> Self {
        Self { consumer }
    }

    /// Move up to `dest.len()` received bytes into `dest`.
    #[inline]
    pub fn drain(&mut self, dest: &mut [u8]) -> usize {
        self.consumer.read(dest)
    }

    /// Bytes waiting to be drained
    #[inline]
    pub fn available(&self) -> usize {
        self.consumer.len()
    }
}
