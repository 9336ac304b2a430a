//! Producer and consumer halves of a [`RingFifo`].

use super::RingFifo;

/// Write half of a split [`RingFifo`].
///
/// Typically owned by the interrupt handler that receives bytes, or by the
/// application code that queues bytes for transmission.
pub struct Producer<'f> {
    fifo: &'f RingFifo<'f>,
}

/// Read half of a split [`RingFifo`].
pub struct Consumer<'f> {
    fifo: &'f RingFifo<'f>,
}

// SAFETY: Producer can be sent to another context because:
// - Only one Producer exists per FIFO (enforced by `RingFifo::split` taking `&mut`)
// - It only writes the producer-owned region and the `write` index
// - Acquire/release on the indices synchronizes with the Consumer
unsafe impl Send for Producer<'_> {}

// SAFETY: Same argument as Producer, mirrored for the consumer-owned region
// and the `read` index.
unsafe impl Send for Consumer<'_> {}

impl<'f> Producer<'f> {
    pub(super) fn new(fifo: &'f RingFifo<'f>) -> Self {
        Self { fifo }
    }

    /// Append up to `data.len()` bytes, returning how many were stored.
    #[inline]
    pub fn write(&mut self, data: &[u8]) -> usize {
        // SAFETY: this is the only producer for the FIFO.
        unsafe { self.fifo.push(data) }
    }

    /// Bytes that can be written right now.
    ///
    /// May grow concurrently as the consumer reads, never shrinks.
    #[inline]
    pub fn free(&self) -> usize {
        self.fifo.free()
    }

    /// Total capacity of the FIFO
    #[inline]
    pub fn capacity(&self) -> usize {
        self.fifo.capacity()
    }
}

impl<'f> Consumer<'f> {
    pub(super) fn new(fifo: &'f RingFifo<'f>) -> Self {
        Self { fifo }
    }

    /// Move up to `dest.len()` bytes out of the FIFO, returning how many.
    #[inline]
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        // SAFETY: this is the only consumer for the FIFO.
        unsafe { self.fifo.pop(dest) }
    }

    /// Bytes available to read right now.
    ///
    /// May grow concurrently as the producer writes, never shrinks.
    #[inline]
    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    /// Check if there is nothing to read
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }
}
