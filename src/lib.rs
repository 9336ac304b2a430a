//! DMA UART Transport
//!
//! A `no_std`, `no_alloc` double-buffered serial transport for UARTs driven
//! by DMA: bytes arrive through a circular receive DMA buffer and leave
//! through one-shot transmit DMA transfers, with a ring FIFO on each side.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! 1. **Ring FIFO** ([`fifo`]): fixed-capacity SPSC byte queue over caller storage
//! 2. **Receive Tracker** ([`rx`]): turns idle-line, half-transfer and
//!    transfer-complete notifications into FIFO appends
//! 3. **Transmit Pump** ([`tx`]): drains the FIFO through one DMA transfer at a time
//! 4. **Registry** ([`driver::registry`]): one tracker/pump pair per UART
//!
//! The board support code owns the peripherals. It implements the
//! [`hal::RxDma`] / [`hal::TxDma`] traits and forwards its interrupts.
//!
//! # Contexts
//!
//! Every FIFO has exactly one producer and one consumer. Interrupt handlers
//! of one port must not preempt each other; application code may be
//! preempted anywhere. Two ways to share a port with its interrupts:
//!
//! - Lock-free: [`ReceiveTracker::split`] and [`TransmitPump::split`] hand
//!   each role its own half.
//! - Critical section: keep the [`Registry`] in a `sync::SharedRegistry`
//!   (feature `critical-section`).
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging and formatting for public types
//! - `critical-section`: Enable the ISR-safe `SharedRegistry` wrapper
//!
//! # Example
//!
//! ```ignore
//! use uart_dma_fifo::{PortConfig, PortId, PortStorage, Registry, RxEvent};
//!
//! static mut RX_FIFO: [u8; 4096] = [0; 4096];
//! static mut TX_FIFO: [u8; 2048] = [0; 2048];
//! static mut TX_DRAIN: [u8; 128] = [0; 128];
//!
//! let storage = PortStorage::new()
//!     .with_rx(unsafe { &mut *core::ptr::addr_of_mut!(RX_FIFO) })
//!     .with_tx(
//!         unsafe { &mut *core::ptr::addr_of_mut!(TX_FIFO) },
//!         unsafe { &mut *core::ptr::addr_of_mut!(TX_DRAIN) },
//!     );
//!
//! let mut registry = Registry::new();
//! registry.enable(PortId::Usart1, &PortConfig::new(), storage)?;
//!
//! // Echo loop
//! let mut buf = [0u8; 64];
//! loop {
//!     registry.pump(PortId::Usart1, &mut tx_dma)?;
//!     let n = registry.drain(PortId::Usart1, &mut buf)?;
//!     registry.enqueue(PortId::Usart1, &buf[..n])?;
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod fifo;
pub mod hal;
pub mod rx;
pub mod tx;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{DmaChannels, DmaController, PortConfig, PortId, RxConfig, TxConfig};
pub use driver::error::{
    ConfigError, ConfigResult, Error, IoError, IoResult, Result, RxError, RxResult,
};
pub use driver::interrupt::{DmaFlags, LineError, UartStatus};
pub use driver::port::{Port, PortStorage};
pub use driver::registry::Registry;
pub use fifo::{Consumer, FifoMode, Producer, RingFifo};
pub use hal::{RxDma, TxDma};
pub use rx::{Absorbed, ReceiveTracker, RxDrain, RxEvent, RxStats, RxTrigger};
pub use tx::{TransmitPump, TxDone, TxParts, TxPumper, TxState, TxStats, TxWriter};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedRegistry};

/// Default sizes and limits.
pub mod constants {
    pub use crate::internal::constants::{
        // Buffer sizes
        DEFAULT_RX_DMA_SIZE,
        DEFAULT_RX_FIFO_SIZE,
        DEFAULT_TX_DRAIN_SIZE,
        DEFAULT_TX_FIFO_SIZE,
        // Limits
        MAX_DMA_TRANSFER,
        MAX_FIFO_CAPACITY,
        PORT_COUNT,
        // Recovery
        RX_RESTART_ATTEMPTS,
        RX_RESTART_DELAY_US,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe registry.
///
/// Expands to a `SharedRegistry<'static>` static; ports enabled on it need
/// `'static` storage.
///
/// # Examples
///
/// ```ignore
/// uart_dma_fifo::uart_registry_static!(REGISTRY);
///
/// REGISTRY.with(|r| r.enable(PortId::Usart1, &PortConfig::new(), storage))?;
///
/// #[interrupt]
/// fn DMA1_CHANNEL4() {
///     REGISTRY.with(|r| r.on_tx_complete(PortId::Usart1)).ok();
/// }
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! uart_registry_static {
    ($name:ident) => {
        static $name: $crate::sync::SharedRegistry<'static> = $crate::sync::SharedRegistry::new();
    };
}

/// Declare static port storage and build a [`PortStorage`] over it.
///
/// Must be expanded once per call site; each expansion owns its buffers
/// and hands them out on the first evaluation only, returning `None`
/// afterwards.
///
/// # Examples
///
/// ```ignore
/// let storage = uart_dma_fifo::port_storage!(rx: 4096, tx: 2048, drain: 128)
///     .expect("storage taken twice");
/// registry.enable(PortId::Usart1, &PortConfig::new(), storage)?;
/// ```
#[macro_export]
macro_rules! port_storage {
    (rx: $rx:expr, tx: $tx:expr, drain: $drain:expr) => {{
        use core::sync::atomic::{AtomicBool, Ordering};
        static TAKEN: AtomicBool = AtomicBool::new(false);
        static mut RX: [u8; $rx] = [0; $rx];
        static mut TX: [u8; $tx] = [0; $tx];
        static mut DRAIN: [u8; $drain] = [0; $drain];
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            // SAFETY: the flag above hands the buffers out at most once.
            Some(unsafe {
                $crate::PortStorage::new()
                    .with_rx(&mut *core::ptr::addr_of_mut!(RX))
                    .with_tx(
                        &mut *core::ptr::addr_of_mut!(TX),
                        &mut *core::ptr::addr_of_mut!(DRAIN),
                    )
            })
        }
    }};
}
