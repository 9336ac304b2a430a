//! Error types for the DMA UART transport
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Port enable and buffer validation failures
//! - [`RxError`]: Inconsistent receive trigger arithmetic
//! - [`IoError`]: Runtime TX/RX failures reported by the hardware seam
//!
//! Overflow loss is not an error: FIFO writes return the number of bytes
//! accepted and the caller compares it against what it offered.
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the registry methods.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These are the only hard failures in the crate. A port that fails to
/// enable stays disabled; every other port keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Backing storage is empty
    EmptyStorage,
    /// FIFO capacity is not a power of two
    CapacityNotPowerOfTwo,
    /// FIFO capacity exceeds 2^31 bytes
    CapacityTooLarge,
    /// Record size is zero or does not divide the capacity
    InvalidRecordSize,
    /// Caller storage is smaller than the configured size
    StorageTooSmall,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Port is already enabled
    AlreadyEnabled,
    /// Port has no DMA channel wired to it
    NoDmaChannel,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::EmptyStorage => "empty storage",
            ConfigError::CapacityNotPowerOfTwo => "capacity not a power of two",
            ConfigError::CapacityTooLarge => "capacity too large",
            ConfigError::InvalidRecordSize => "invalid record size",
            ConfigError::StorageTooSmall => "storage smaller than configured size",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::AlreadyEnabled => "port already enabled",
            ConfigError::NoDmaChannel => "port has no DMA channel",
        }
    }
}

// =============================================================================
// Receive Errors
// =============================================================================

/// Receive trigger errors
///
/// Every variant is recoverable. By the time one is returned the tracker
/// has already put itself back into a consistent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// The DMA write cursor was behind the tracker, meaning a trigger was
    /// missed or duplicated. The tracker resynchronized to the hardware
    /// position and `skipped` bytes of the hardware buffer were discarded.
    MissedTrigger {
        /// Bytes of the hardware buffer that were skipped
        skipped: usize,
    },
    /// The reported DMA remaining-count exceeds the hardware buffer size
    PositionOutOfRange,
    /// The hardware buffer slice does not match the configured size
    BufferMismatch,
}

impl core::fmt::Display for RxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RxError::MissedTrigger { skipped } => {
                write!(f, "{} ({skipped} bytes skipped)", self.as_str())
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

impl RxError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RxError::MissedTrigger { .. } => "missed receive trigger",
            RxError::PositionOutOfRange => "DMA position out of range",
            RxError::BufferMismatch => "hardware buffer size mismatch",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime TX/RX errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// The port or the requested direction is not enabled
    NotEnabled,
    /// The DMA channel refused to start a transfer
    TransferFailed,
    /// The receive DMA could not be restarted after a line error
    RestartFailed,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::NotEnabled => "not enabled",
            IoError::TransferFailed => "DMA transfer failed to start",
            IoError::RestartFailed => "receive DMA restart failed",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::NoDmaChannel)) => { /* ... */ }
///     Err(Error::Rx(RxError::MissedTrigger { skipped })) => { /* ... */ }
///     Err(Error::Io(IoError::NotEnabled)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Receive trigger error
    Rx(RxError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Rx(e) => write!(f, "rx: {e}"),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<RxError> for Error {
    fn from(e: RxError) -> Self {
        Error::Rx(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for registry operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for receive trigger operations
pub type RxResult<T> = core::result::Result<T, RxError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
