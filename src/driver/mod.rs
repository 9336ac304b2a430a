//! Port-level driver components.
//!
//! - [`config`] - Port identities and configuration builders
//! - [`error`] - Error types and result aliases
//! - [`interrupt`] - Status register and DMA flag decoding
//! - [`port`] - One UART's receive tracker and transmit pump
//! - [`registry`] - Instance registry keyed by port
//!
//! # Example
//!
//! ```ignore
//! use uart_dma_fifo::driver::{PortConfig, RxConfig};
//!
//! let config = PortConfig::new()
//!     .with_rx(RxConfig::new().with_dma_buffer_size(256))
//!     .without_tx();
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod interrupt;
pub mod port;
pub mod registry;

// Re-exports for convenience
pub use config::{DmaChannels, DmaController, PortConfig, PortId, RxConfig, TxConfig};
pub use error::{
    ConfigError, ConfigResult, Error, IoError, IoResult, Result, RxError, RxResult,
};
pub use interrupt::{DmaFlags, LineError, UartStatus};
pub use port::{Port, PortStorage};
pub use registry::Registry;
