//! Instance registry: one slot per UART.

use crate::driver::config::{PortConfig, PortId};
use crate::driver::error::{ConfigError, ConfigResult, IoError, IoResult, Result};
use crate::driver::port::{Port, PortStorage};
use crate::hal::TxDma;
use crate::internal::constants::PORT_COUNT;
use crate::rx::{Absorbed, RxEvent};

/// Enabled ports keyed by [`PortId`].
///
/// Each port owns its buffers; nothing is shared between slots, so a port
/// that fails to enable leaves the others untouched.
///
/// # Example
///
/// ```ignore
/// let mut registry = Registry::new();
/// registry.enable(PortId::Usart1, &PortConfig::new(), storage)?;
///
/// // USART1 idle interrupt
/// registry.on_rx_event(PortId::Usart1, RxEvent::Idle { remaining }, hw)?;
///
/// // Main loop
/// let n = registry.drain(PortId::Usart1, &mut buf)?;
/// registry.enqueue(PortId::Usart1, &buf[..n])?;
/// registry.pump(PortId::Usart1, &mut tx_dma)?;
/// ```
pub struct Registry<'a> {
    ports: [Option<Port<'a>>; PORT_COUNT],
}

impl Default for Registry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Registry<'a> {
    /// Registry with every port disabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ports: [const { None }; PORT_COUNT],
        }
    }

    /// Enable `id` with `config` over `storage`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AlreadyEnabled`] if the port is already enabled
    /// - Any [`Port::new`] error; the port then stays disabled
    pub fn enable(
        &mut self,
        id: PortId,
        config: &PortConfig,
        storage: PortStorage<'a>,
    ) -> ConfigResult<()> {
        let slot = &mut self.ports[id.index()];
        if slot.is_some() {
            return Err(ConfigError::AlreadyEnabled);
        }

        match Port::new(id, config, storage) {
            Ok(port) => {
                *slot = Some(port);

                #[cfg(feature = "defmt")]
                defmt::info!(
                    "{}: enabled (rx={}, tx={})",
                    id,
                    config.rx.is_some(),
                    config.tx.is_some()
                );

                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: enable failed: {}", id, e);

                Err(e)
            }
        }
    }

    /// Disable `id`, handing back its port (and with it the storage borrow).
    pub fn disable(&mut self, id: PortId) -> Option<Port<'a>> {
        let port = self.ports[id.index()].take();

        #[cfg(feature = "defmt")]
        {
            if port.is_some() {
                defmt::info!("{}: disabled", id);
            }
        }

        port
    }

    /// Check if `id` is enabled
    #[inline]
    pub fn is_enabled(&self, id: PortId) -> bool {
        self.ports[id.index()].is_some()
    }

    /// The port for `id`, if enabled
    pub fn port(&self, id: PortId) -> Option<&Port<'a>> {
        self.ports[id.index()].as_ref()
    }

    /// The port for `id`, if enabled
    pub fn port_mut(&mut self, id: PortId) -> Option<&mut Port<'a>> {
        self.ports[id.index()].as_mut()
    }

    /// Enabled ports in [`PortId`] order
    pub fn enabled(&self) -> impl Iterator<Item = &Port<'a>> {
        self.ports.iter().flatten()
    }

    fn get(&mut self, id: PortId) -> IoResult<&mut Port<'a>> {
        self.port_mut(id).ok_or(IoError::NotEnabled)
    }

    /// Move received bytes of `id` into `dest`.
    pub fn drain(&mut self, id: PortId, dest: &mut [u8]) -> IoResult<usize> {
        self.get(id)?.drain(dest)
    }

    /// Queue bytes on `id`, returning how many were accepted.
    pub fn enqueue(&mut self, id: PortId, data: &[u8]) -> IoResult<usize> {
        self.get(id)?.enqueue(data)
    }

    /// Start the next transmit transfer on `id`.
    pub fn pump<D: TxDma + ?Sized>(&mut self, id: PortId, dma: &mut D) -> IoResult<usize> {
        self.get(id)?.pump(dma)
    }

    /// Deliver a receive notification for `id`.
    pub fn on_rx_event(&mut self, id: PortId, event: RxEvent, hw: &[u8]) -> Result<Absorbed> {
        self.get(id)?.on_rx_event(event, hw)
    }

    /// Deliver the transmit-complete notification for `id`.
    pub fn on_tx_complete(&mut self, id: PortId) -> IoResult<()> {
        self.get(id)?.on_tx_complete()
    }
}

impl core::fmt::Debug for Registry<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.enabled().map(Port::id))
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
