//! Configuration types for the DMA UART transport

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_RX_DMA_SIZE, DEFAULT_RX_FIFO_SIZE, DEFAULT_TX_DRAIN_SIZE, DEFAULT_TX_FIFO_SIZE,
    MAX_DMA_TRANSFER, MAX_FIFO_CAPACITY, PORT_COUNT,
};

// =============================================================================
// Port Identity
// =============================================================================

/// Hardware UART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    /// USART1
    Usart1,
    /// USART2
    Usart2,
    /// USART3
    Usart3,
    /// UART4
    Uart4,
    /// UART5 (no DMA request lines)
    Uart5,
}

/// DMA controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaController {
    /// DMA1 (7 channels)
    Dma1,
    /// DMA2 (5 channels)
    Dma2,
}

/// DMA channels serving one port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaChannels {
    /// Controller both channels belong to
    pub controller: DmaController,
    /// Receive channel number (1-based)
    pub rx: u8,
    /// Transmit channel number (1-based)
    pub tx: u8,
}

impl PortId {
    /// All ports in registry order
    pub const ALL: [PortId; PORT_COUNT] = [
        PortId::Usart1,
        PortId::Usart2,
        PortId::Usart3,
        PortId::Uart4,
        PortId::Uart5,
    ];

    /// Registry slot of this port
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Port for a registry slot
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < PORT_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Fixed DMA request mapping, `None` for ports without DMA
    #[must_use]
    pub const fn dma_channels(self) -> Option<DmaChannels> {
        let (controller, rx, tx) = match self {
            PortId::Usart1 => (DmaController::Dma1, 5, 4),
            PortId::Usart2 => (DmaController::Dma1, 6, 7),
            PortId::Usart3 => (DmaController::Dma1, 3, 2),
            PortId::Uart4 => (DmaController::Dma2, 3, 5),
            PortId::Uart5 => return None,
        };
        Some(DmaChannels { controller, rx, tx })
    }

    /// Check if this port can be driven by DMA
    #[inline]
    #[must_use]
    pub const fn has_dma(self) -> bool {
        self.dma_channels().is_some()
    }

    /// Peripheral name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PortId::Usart1 => "USART1",
            PortId::Usart2 => "USART2",
            PortId::Usart3 => "USART3",
            PortId::Uart4 => "UART4",
            PortId::Uart5 => "UART5",
        }
    }
}

impl core::fmt::Display for PortId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Direction Configuration
// =============================================================================

/// Receive direction configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxConfig {
    /// Receive FIFO capacity (power of two)
    pub fifo_size: usize,
    /// Circular DMA buffer size
    pub dma_buffer_size: usize,
    /// Deliver short bursts on idle line. Without it bytes only move at the
    /// half and full marks.
    pub idle_interrupt: bool,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RxConfig {
    /// Default receive sizes with idle-line delivery
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fifo_size: DEFAULT_RX_FIFO_SIZE,
            dma_buffer_size: DEFAULT_RX_DMA_SIZE,
            idle_interrupt: true,
        }
    }

    /// Set the FIFO capacity
    #[must_use]
    pub const fn with_fifo_size(mut self, size: usize) -> Self {
        self.fifo_size = size;
        self
    }

    /// Set the circular DMA buffer size
    #[must_use]
    pub const fn with_dma_buffer_size(mut self, size: usize) -> Self {
        self.dma_buffer_size = size;
        self
    }

    /// Enable or disable idle-line delivery
    #[must_use]
    pub const fn with_idle_interrupt(mut self, enabled: bool) -> Self {
        self.idle_interrupt = enabled;
        self
    }

    /// Check sizes against FIFO and DMA limits
    pub const fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = validate_fifo_size(self.fifo_size) {
            return Err(e);
        }
        validate_dma_size(self.dma_buffer_size)
    }
}

/// Transmit direction configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxConfig {
    /// Transmit FIFO capacity (power of two)
    pub fifo_size: usize,
    /// Drain buffer size, the largest single transfer
    pub drain_size: usize,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TxConfig {
    /// Default transmit sizes
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fifo_size: DEFAULT_TX_FIFO_SIZE,
            drain_size: DEFAULT_TX_DRAIN_SIZE,
        }
    }

    /// Set the FIFO capacity
    #[must_use]
    pub const fn with_fifo_size(mut self, size: usize) -> Self {
        self.fifo_size = size;
        self
    }

    /// Set the drain buffer size
    #[must_use]
    pub const fn with_drain_size(mut self, size: usize) -> Self {
        self.drain_size = size;
        self
    }

    /// Check sizes against FIFO and DMA limits
    pub const fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = validate_fifo_size(self.fifo_size) {
            return Err(e);
        }
        validate_dma_size(self.drain_size)
    }
}

const fn validate_fifo_size(size: usize) -> ConfigResult<()> {
    if size == 0 {
        Err(ConfigError::EmptyStorage)
    } else if !size.is_power_of_two() {
        Err(ConfigError::CapacityNotPowerOfTwo)
    } else if size > MAX_FIFO_CAPACITY {
        Err(ConfigError::CapacityTooLarge)
    } else {
        Ok(())
    }
}

const fn validate_dma_size(size: usize) -> ConfigResult<()> {
    if size == 0 || size > MAX_DMA_TRANSFER {
        Err(ConfigError::InvalidConfig)
    } else {
        Ok(())
    }
}

// =============================================================================
// Port Configuration
// =============================================================================

/// Configuration for one port.
///
/// # Example
///
/// ```ignore
/// // Receive-only, bytes delivered at half/full marks only
/// let config = PortConfig::new()
///     .without_tx()
///     .with_idle_interrupt(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortConfig {
    /// Receive direction, `None` to leave it off
    pub rx: Option<RxConfig>,
    /// Transmit direction, `None` to leave it off
    pub tx: Option<TxConfig>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PortConfig {
    /// Both directions with default sizes
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx: Some(RxConfig::new()),
            tx: Some(TxConfig::new()),
        }
    }

    /// Set the receive configuration
    #[must_use]
    pub const fn with_rx(mut self, rx: RxConfig) -> Self {
        self.rx = Some(rx);
        self
    }

    /// Leave the receive direction off
    #[must_use]
    pub const fn without_rx(mut self) -> Self {
        self.rx = None;
        self
    }

    /// Set the transmit configuration
    #[must_use]
    pub const fn with_tx(mut self, tx: TxConfig) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Leave the transmit direction off
    #[must_use]
    pub const fn without_tx(mut self) -> Self {
        self.tx = None;
        self
    }

    /// Enable or disable idle-line delivery. No effect without receive.
    #[must_use]
    pub const fn with_idle_interrupt(mut self, enabled: bool) -> Self {
        if let Some(rx) = self.rx {
            self.rx = Some(rx.with_idle_interrupt(enabled));
        }
        self
    }

    /// Validate the configuration
    ///
    /// At least one direction must be on and every size must be usable.
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.rx.is_none() && self.tx.is_none() {
            return Err(ConfigError::InvalidConfig);
        }
        if let Some(rx) = &self.rx {
            if let Err(e) = rx.validate() {
                return Err(e);
            }
        }
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.validate() {
                return Err(e);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Port Identity Tests
    // =========================================================================

    #[test]
    fn port_index_round_trip() {
        for (i, id) in PortId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(PortId::from_index(i), Some(*id));
        }
        assert_eq!(PortId::from_index(PORT_COUNT), None);
    }

    #[test]
    fn only_uart5_lacks_dma() {
        assert!(PortId::Usart1.has_dma());
        assert!(PortId::Usart2.has_dma());
        assert!(PortId::Usart3.has_dma());
        assert!(PortId::Uart4.has_dma());
        assert!(!PortId::Uart5.has_dma());
    }

    #[test]
    fn dma_channel_mapping() {
        let usart1 = PortId::Usart1.dma_channels().unwrap();
        assert_eq!(usart1.controller, DmaController::Dma1);
        assert_eq!((usart1.rx, usart1.tx), (5, 4));

        let uart4 = PortId::Uart4.dma_channels().unwrap();
        assert_eq!(uart4.controller, DmaController::Dma2);
        assert_eq!((uart4.rx, uart4.tx), (3, 5));
    }

    #[test]
    fn port_display_name() {
        extern crate std;
        assert_eq!(std::format!("{}", PortId::Uart4), "UART4");
    }

    // =========================================================================
    // Default Value Tests
    // =========================================================================

    #[test]
    fn config_default_values() {
        let config = PortConfig::new();
        let rx = config.rx.unwrap();
        let tx = config.tx.unwrap();

        assert_eq!(rx.fifo_size, 4096);
        assert_eq!(rx.dma_buffer_size, 128);
        assert!(rx.idle_interrupt);
        assert_eq!(tx.fifo_size, 2048);
        assert_eq!(tx.drain_size, 128);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn config_default_trait_matches_new() {
        assert_eq!(PortConfig::default(), PortConfig::new());
        assert_eq!(RxConfig::default(), RxConfig::new());
        assert_eq!(TxConfig::default(), TxConfig::new());
    }

    // =========================================================================
    // Builder Pattern Tests
    // =========================================================================

    #[test]
    fn config_builder_directions() {
        let config = PortConfig::new().without_tx();
        assert!(config.rx.is_some());
        assert!(config.tx.is_none());

        let config = PortConfig::new()
            .without_rx()
            .with_tx(TxConfig::new().with_drain_size(32));
        assert!(config.rx.is_none());
        assert_eq!(config.tx.unwrap().drain_size, 32);
    }

    #[test]
    fn config_builder_idle_interrupt() {
        let config = PortConfig::new().with_idle_interrupt(false);
        assert!(!config.rx.unwrap().idle_interrupt);

        // Ignored without receive
        let config = PortConfig::new().without_rx().with_idle_interrupt(true);
        assert!(config.rx.is_none());
    }

    #[test]
    fn config_builder_is_const() {
        const CONFIG: PortConfig = PortConfig::new()
            .with_rx(RxConfig::new().with_fifo_size(256).with_dma_buffer_size(64))
            .without_tx();
        assert_eq!(CONFIG.rx.unwrap().fifo_size, 256);
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn validate_rejects_no_direction() {
        let config = PortConfig::new().without_rx().without_tx();
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));
    }

    #[test]
    fn validate_rejects_bad_fifo_sizes() {
        let config = PortConfig::new().with_rx(RxConfig::new().with_fifo_size(1000));
        assert_eq!(config.validate(), Err(ConfigError::CapacityNotPowerOfTwo));

        let config = PortConfig::new().with_tx(TxConfig::new().with_fifo_size(0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyStorage));
    }

    #[test]
    fn validate_rejects_bad_dma_sizes() {
        let config = PortConfig::new().with_rx(RxConfig::new().with_dma_buffer_size(0));
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));

        let config =
            PortConfig::new().with_tx(TxConfig::new().with_drain_size(MAX_DMA_TRANSFER + 1));
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));
    }
}
