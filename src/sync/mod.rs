//! Synchronization Support
//!
//! Critical-section protected access to the registry for applications that
//! keep it in a `static` and reach it from interrupt handlers.
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability
//! - [`SharedRegistry`] - critical-section protected [`Registry`]
//!
//! The lock-free alternative needs no feature: split a port's
//! [`ReceiveTracker`] and [`TransmitPump`] and give each half to the context
//! that drives it.
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! [`Registry`]: crate::driver::registry::Registry
//! [`ReceiveTracker`]: crate::rx::ReceiveTracker
//! [`TransmitPump`]: crate::tx::TransmitPump

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedRegistry;
