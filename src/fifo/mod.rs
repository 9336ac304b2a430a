//! Ring FIFO
//!
//! A fixed-capacity circular byte queue over caller-supplied storage.
//!
//! # Index Scheme
//!
//! The read and write indices are free-running `u32` counters. The slot
//! for an index is `index & (capacity - 1)`, which is why the capacity
//! must be a power of two, and the fill level is always
//! `write.wrapping_sub(read)`. Neither counter is ever reset on wrap, so
//! "full" and "empty" never alias.
//!
//! ```text
//!            read & mask          write & mask
//!                 |                    |
//!                 v                    v
//!   +---------+---+---+---+---+---+---+---------+
//!   |  free   | d | d | d | d | d | d |  free   |
//!   +---------+---+---+---+---+---+---+---------+
//!             <------ write - read ---->
//! ```
//!
//! # Producer / Consumer Contract
//!
//! Exactly one context may write and exactly one context may read at any
//! time. With exclusive access (`&mut RingFifo`) both roles are held by the
//! caller. To hand the roles to different contexts (an interrupt handler
//! and the main loop) call [`RingFifo::split`]; the borrow checker then
//! guarantees a single [`Producer`] and a single [`Consumer`]. The two halves
//! synchronize through acquire/release atomics only, no lock is taken.
//!
//! # Overflow
//!
//! Writes never block and never grow the buffer. When fewer bytes are free
//! than offered, only the leading bytes that fit are stored and the return
//! value tells the caller how many.

mod split;

pub use split::{Consumer, Producer};

use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicU32, Ordering};

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::MAX_FIFO_CAPACITY;

// =============================================================================
// Element Mode
// =============================================================================

/// Element addressing mode of a [`RingFifo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoMode {
    /// Opaque byte stream, any length may be written or read
    #[default]
    Stream,
    /// Fixed-size records of the given byte size. Writes and reads move
    /// whole records only.
    Record(u16),
}

impl FifoMode {
    /// Round `len` down to what this mode may move in one operation
    #[inline(always)]
    const fn truncate(self, len: usize) -> usize {
        match self {
            FifoMode::Stream => len,
            FifoMode::Record(size) => len - len % size as usize,
        }
    }
}

// =============================================================================
// Ring FIFO
// =============================================================================

/// Fixed-capacity circular byte queue.
///
/// # Example
///
/// ```ignore
/// let mut storage = [0u8; 8];
/// let mut fifo = RingFifo::new(&mut storage, FifoMode::Stream)?;
///
/// assert_eq!(fifo.write(&[1, 2, 3, 4, 5]), 5);
/// assert_eq!(fifo.write(&[6, 7, 8, 9]), 3); // 9 dropped
///
/// let mut out = [0u8; 10];
/// assert_eq!(fifo.read(&mut out), 8);
/// ```
pub struct RingFifo<'a> {
    /// Start of the caller's storage
    buf: NonNull<u8>,
    /// `capacity - 1`
    mask: u32,
    /// Element addressing mode
    mode: FifoMode,
    /// Total bytes ever written (wrapping)
    write: AtomicU32,
    /// Total bytes ever read (wrapping)
    read: AtomicU32,
    _storage: PhantomData<&'a mut [u8]>,
}

// SAFETY: RingFifo logically owns an `&'a mut [u8]`, which is `Send`. The
// raw pointer is only dereferenced through methods that uphold the
// single-producer/single-consumer contract.
unsafe impl Send for RingFifo<'_> {}

impl<'a> RingFifo<'a> {
    /// Create a FIFO over `storage`.
    ///
    /// The whole slice is used; its length is the capacity.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyStorage`] if `storage` is empty
    /// - [`ConfigError::CapacityNotPowerOfTwo`] if the length is not a power of two
    /// - [`ConfigError::CapacityTooLarge`] if the length exceeds 2^31
    /// - [`ConfigError::InvalidRecordSize`] for a zero record size or one
    ///   that does not divide the capacity
    pub fn new(storage: &'a mut [u8], mode: FifoMode) -> ConfigResult<Self> {
        let capacity = storage.len();
        if capacity == 0 {
            return Err(ConfigError::EmptyStorage);
        }
        if !capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo);
        }
        if capacity > MAX_FIFO_CAPACITY {
            return Err(ConfigError::CapacityTooLarge);
        }
        if let FifoMode::Record(size) = mode {
            if size == 0 || capacity % size as usize != 0 {
                return Err(ConfigError::InvalidRecordSize);
            }
        }

        Ok(Self {
            buf: NonNull::from(storage).cast(),
            mask: (capacity - 1) as u32,
            mode,
            write: AtomicU32::new(0),
            read: AtomicU32::new(0),
            _storage: PhantomData,
        })
    }

    /// Total number of bytes the FIFO can hold
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.mask as usize + 1
    }

    /// Element addressing mode
    #[inline(always)]
    pub fn mode(&self) -> FifoMode {
        self.mode
    }

    /// Number of unread bytes
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read) as usize
    }

    /// Number of bytes that can be written before data is dropped
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Check if there is nothing to read
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a write would drop everything
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Append up to `data.len()` bytes, returning how many were stored.
    ///
    /// Bytes that do not fit are dropped from the tail of `data`.
    #[inline]
    pub fn write(&mut self, data: &[u8]) -> usize {
        // SAFETY: `&mut self` makes the caller the only producer.
        unsafe { self.push(data) }
    }

    /// Move up to `dest.len()` bytes out of the FIFO, returning how many.
    #[inline]
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        // SAFETY: `&mut self` makes the caller the only consumer.
        unsafe { self.pop(dest) }
    }

    /// Discard all unread bytes
    pub fn clear(&mut self) {
        let write = self.write.load(Ordering::Relaxed);
        self.read.store(write, Ordering::Release);
    }

    /// Split into the producer and consumer roles.
    ///
    /// Both halves borrow the FIFO, so no other access is possible until
    /// they are dropped.
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        let fifo: &RingFifo<'_> = self;
        (Producer::new(fifo), Consumer::new(fifo))
    }

    /// Copy `data` in at the write index.
    ///
    /// # Safety
    ///
    /// The caller must be the only producer for the duration of the call.
    pub(crate) unsafe fn push(&self, data: &[u8]) -> usize {
        // Relaxed: only the producer stores `write`.
        let write = self.write.load(Ordering::Relaxed);
        // Acquire: the consumer's copy out of these slots happened before.
        let read = self.read.load(Ordering::Acquire);
        let free = self.capacity() - write.wrapping_sub(read) as usize;
        let len = self.mode.truncate(data.len().min(free));
        if len == 0 {
            return 0;
        }

        let start = (write & self.mask) as usize;
        let first = len.min(self.capacity() - start);
        let dst = self.buf.as_ptr();
        // SAFETY:
        // - src: `data[..len]` is valid for reads.
        // - dst: `start + first <= capacity` and `len - first <= start`, so both
        //   copies stay in the storage, in the free region owned by the producer.
        // - nonoverlapping: `data` is a shared borrow, the storage is
        //   exclusively borrowed by this FIFO.
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), dst.add(start), first);
            ptr::copy_nonoverlapping(data.as_ptr().add(first), dst, len - first);
        }

        // Release: publish the bytes before the new index.
        self.write
            .store(write.wrapping_add(len as u32), Ordering::Release);
        len
    }

    /// Copy out of the read index into `dest`.
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer for the duration of the call.
    pub(crate) unsafe fn pop(&self, dest: &mut [u8]) -> usize {
        // Relaxed: only the consumer stores `read`.
        let read = self.read.load(Ordering::Relaxed);
        // Acquire: the producer's copy into these slots happened before.
        let write = self.write.load(Ordering::Acquire);
        let used = write.wrapping_sub(read) as usize;
        let len = self.mode.truncate(dest.len().min(used));
        if len == 0 {
            return 0;
        }

        let start = (read & self.mask) as usize;
        let first = len.min(self.capacity() - start);
        let src = self.buf.as_ptr();
        // SAFETY: same bounds argument as `push`, over the used region owned
        // by the consumer.
        unsafe {
            ptr::copy_nonoverlapping(src.add(start), dest.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(src, dest.as_mut_ptr().add(first), len - first);
        }

        // Release: our reads of the slots finish before the producer reuses them.
        self.read
            .store(read.wrapping_add(len as u32), Ordering::Release);
        len
    }

    #[cfg(test)]
    pub(crate) fn set_indices(&mut self, read: u32, write: u32) {
        self.read.store(read, Ordering::Relaxed);
        self.write.store(write, Ordering::Relaxed);
    }
}

impl core::fmt::Debug for RingFifo<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingFifo")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("mode", &self.mode)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
