//! Hardware Abstraction Layer
//!
//! Traits at the seam between the transport and the board's DMA streams.
//! The board support code implements them on top of its own HAL; this
//! crate never touches peripheral registers.
//!
//! # Delay Integration
//!
//! Receive recovery backs off with `embedded_hal::delay::DelayNs`. Pass any
//! delay implementation from your HAL.

use crate::driver::error::IoResult;

// =============================================================================
// Receive DMA
// =============================================================================

/// A receive DMA stream running in circular mode.
///
/// The stream writes into a fixed buffer and wraps to its start without
/// stopping. The transport only ever reads the buffer.
pub trait RxDma {
    /// The circular buffer the stream writes into
    fn buffer(&self) -> &[u8];

    /// Current value of the remaining-count register
    ///
    /// Counts down from `buffer().len()` and reloads on wrap.
    fn remaining(&self) -> usize;

    /// Stop the stream, clear its flags and restart it at the buffer start.
    fn restart(&mut self) -> IoResult<()>;
}

// =============================================================================
// Transmit DMA
// =============================================================================

/// A transmit DMA stream in normal (one-shot) mode.
pub trait TxDma {
    /// Start one transfer of `data`.
    ///
    /// The implementation may keep reading `data` after returning. The
    /// caller leaves it untouched until the transfer-complete notification.
    fn start(&mut self, data: &[u8]) -> IoResult<()>;
}

impl<T: RxDma + ?Sized> RxDma for &mut T {
    #[inline]
    fn buffer(&self) -> &[u8] {
        (**self).buffer()
    }

    #[inline]
    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    #[inline]
    fn restart(&mut self) -> IoResult<()> {
        (**self).restart()
    }
}

impl<T: TxDma + ?Sized> TxDma for &mut T {
    #[inline]
    fn start(&mut self, data: &[u8]) -> IoResult<()> {
        (**self).start(data)
    }
}
