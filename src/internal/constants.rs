//! Centralized Constants
//!
//! Single source of truth for the default sizes and limits used by the
//! transport.
//!
//! # Organization
//!
//! - **Default buffer sizes**: FIFO and DMA buffer sizes applied by
//!   [`PortConfig::new`](crate::driver::config::PortConfig::new)
//! - **Limits**: FIFO index range and port count
//! - **Recovery**: RX restart retry policy
//!
//! Status register bit definitions live in `internal::register`.

// =============================================================================
// Default Buffer Sizes
// =============================================================================

/// Default receive FIFO capacity in bytes (power of two)
pub const DEFAULT_RX_FIFO_SIZE: usize = 4096;

/// Default receive DMA circular buffer size in bytes
pub const DEFAULT_RX_DMA_SIZE: usize = 128;

/// Default transmit FIFO capacity in bytes (power of two)
pub const DEFAULT_TX_FIFO_SIZE: usize = 2048;

/// Default transmit drain buffer size in bytes
pub const DEFAULT_TX_DRAIN_SIZE: usize = 128;

// =============================================================================
// Limits
// =============================================================================

/// Largest FIFO capacity. Indices are `u32` counters, so the distance
/// between them must stay representable.
pub const MAX_FIFO_CAPACITY: usize = 1 << 31;

/// Largest single DMA transfer (16-bit transfer counter)
pub const MAX_DMA_TRANSFER: usize = u16::MAX as usize;

/// Number of UART instances known to the registry
pub const PORT_COUNT: usize = 5;

// =============================================================================
// Recovery
// =============================================================================

/// Attempts made to restart receive DMA after a line error
pub const RX_RESTART_ATTEMPTS: u32 = 8;

/// Delay between receive DMA restart attempts in microseconds
pub const RX_RESTART_DELAY_US: u32 = 10;
