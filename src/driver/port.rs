//! One physical UART: its receive tracker, transmit pump and the
//! receive error recovery path.

use embedded_hal::delay::DelayNs;

use crate::driver::config::{PortConfig, PortId};
use crate::driver::error::{ConfigError, ConfigResult, IoError, IoResult, Result};
use crate::driver::interrupt::{DmaFlags, LineError, UartStatus};
use crate::fifo::{FifoMode, RingFifo};
use crate::hal::{RxDma, TxDma};
use crate::internal::constants::{RX_RESTART_ATTEMPTS, RX_RESTART_DELAY_US};
use crate::rx::{Absorbed, ReceiveTracker, RxEvent, RxStats};
use crate::tx::{TransmitPump, TxStats};

// =============================================================================
// Storage
// =============================================================================

/// Caller-owned buffers for one port.
///
/// Each buffer must be at least as large as the matching configured size;
/// only the leading part is used. The receive DMA buffer belongs to the
/// [`RxDma`] implementation and is not listed here.
#[derive(Debug, Default)]
pub struct PortStorage<'a> {
    rx_fifo: Option<&'a mut [u8]>,
    tx_fifo: Option<&'a mut [u8]>,
    tx_drain: Option<&'a mut [u8]>,
}

impl<'a> PortStorage<'a> {
    /// No buffers
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx_fifo: None,
            tx_fifo: None,
            tx_drain: None,
        }
    }

    /// Backing storage for the receive FIFO
    #[must_use]
    pub fn with_rx(mut self, fifo: &'a mut [u8]) -> Self {
        self.rx_fifo = Some(fifo);
        self
    }

    /// Backing storage for the transmit FIFO and drain buffer
    #[must_use]
    pub fn with_tx(mut self, fifo: &'a mut [u8], drain: &'a mut [u8]) -> Self {
        self.tx_fifo = Some(fifo);
        self.tx_drain = Some(drain);
        self
    }
}

/// Leading `size` bytes of `storage`
fn carve(storage: Option<&mut [u8]>, size: usize) -> ConfigResult<&mut [u8]> {
    let buf = storage.ok_or(ConfigError::EmptyStorage)?;
    buf.get_mut(..size).ok_or(ConfigError::StorageTooSmall)
}

// =============================================================================
// Port
// =============================================================================

/// Receive side of a port
struct RxSide<'a> {
    tracker: ReceiveTracker<'a>,
    idle_interrupt: bool,
}

/// One enabled UART.
///
/// Interrupt handlers call the `on_*` methods, application code calls
/// [`drain`](Self::drain), [`enqueue`](Self::enqueue) and
/// [`pump`](Self::pump). A direction left off in the [`PortConfig`] answers
/// with [`IoError::NotEnabled`].
pub struct Port<'a> {
    id: PortId,
    rx: Option<RxSide<'a>>,
    tx: Option<TransmitPump<'a>>,
}

impl<'a> Port<'a> {
    /// Build a port from `config` over caller storage.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoDmaChannel`] if `id` has no DMA channels
    /// - Any [`PortConfig::validate`] error
    /// - [`ConfigError::EmptyStorage`] if a configured direction has no storage
    /// - [`ConfigError::StorageTooSmall`] if a buffer is smaller than configured
    pub fn new(id: PortId, config: &PortConfig, storage: PortStorage<'a>) -> ConfigResult<Self> {
        if !id.has_dma() {
            return Err(ConfigError::NoDmaChannel);
        }
        config.validate()?;

        let PortStorage {
            rx_fifo,
            tx_fifo,
            tx_drain,
        } = storage;

        let rx = match config.rx {
            Some(rx) => {
                let fifo = RingFifo::new(carve(rx_fifo, rx.fifo_size)?, FifoMode::Stream)?;
                Some(RxSide {
                    tracker: ReceiveTracker::new(fifo, rx.dma_buffer_size)?,
                    idle_interrupt: rx.idle_interrupt,
                })
            }
            None => None,
        };

        let tx = match config.tx {
            Some(tx) => {
                let fifo = RingFifo::new(carve(tx_fifo, tx.fifo_size)?, FifoMode::Stream)?;
                Some(TransmitPump::new(fifo, carve(tx_drain, tx.drain_size)?)?)
            }
            None => None,
        };

        Ok(Self { id, rx, tx })
    }

    /// Which UART this is
    #[inline]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Check if the receive direction is on
    #[inline]
    pub fn has_rx(&self) -> bool {
        self.rx.is_some()
    }

    /// Check if the transmit direction is on
    #[inline]
    pub fn has_tx(&self) -> bool {
        self.tx.is_some()
    }

    /// Check if idle-line events are delivered
    #[inline]
    pub fn idle_interrupt(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| rx.idle_interrupt)
    }

    /// The receive tracker, if receive is on
    pub fn rx(&self) -> Option<&ReceiveTracker<'a>> {
        self.rx.as_ref().map(|rx| &rx.tracker)
    }

    /// The receive tracker, for splitting into interrupt and drain halves
    pub fn rx_mut(&mut self) -> Option<&mut ReceiveTracker<'a>> {
        self.rx.as_mut().map(|rx| &mut rx.tracker)
    }

    /// The transmit pump, if transmit is on
    pub fn tx(&self) -> Option<&TransmitPump<'a>> {
        self.tx.as_ref()
    }

    /// The transmit pump, for splitting into its roles
    pub fn tx_mut(&mut self) -> Option<&mut TransmitPump<'a>> {
        self.tx.as_mut()
    }

    fn rx_side(&mut self) -> IoResult<&mut RxSide<'a>> {
        self.rx.as_mut().ok_or(IoError::NotEnabled)
    }

    fn tx_side(&mut self) -> IoResult<&mut TransmitPump<'a>> {
        self.tx.as_mut().ok_or(IoError::NotEnabled)
    }

    // =========================================================================
    // Application Side
    // =========================================================================

    /// Move received bytes into `dest`, returning how many.
    pub fn drain(&mut self, dest: &mut [u8]) -> IoResult<usize> {
        Ok(self.rx_side()?.tracker.drain(dest))
    }

    /// Queue bytes for transmission, returning how many were accepted.
    pub fn enqueue(&mut self, data: &[u8]) -> IoResult<usize> {
        Ok(self.tx_side()?.enqueue(data))
    }

    /// Start the next transmit transfer if possible.
    pub fn pump<D: TxDma + ?Sized>(&mut self, dma: &mut D) -> IoResult<usize> {
        self.tx_side()?.pump(dma)
    }

    /// Receive counters, if receive is on
    pub fn rx_stats(&self) -> Option<RxStats> {
        self.rx().map(ReceiveTracker::stats)
    }

    /// Transmit counters, if transmit is on
    pub fn tx_stats(&self) -> Option<TxStats> {
        self.tx().map(TransmitPump::stats)
    }

    // =========================================================================
    // Interrupt Side
    // =========================================================================

    /// Feed one receive notification against the hardware buffer `hw`.
    ///
    /// Idle events are ignored when the idle interrupt is off.
    pub fn on_rx_event(&mut self, event: RxEvent, hw: &[u8]) -> Result<Absorbed> {
        let rx = self.rx_side()?;
        if matches!(event, RxEvent::Idle { .. }) && !rx.idle_interrupt {
            return Ok(Absorbed::default());
        }
        Ok(rx.tracker.on_event(event, hw)?)
    }

    /// [`on_rx_event`](Self::on_rx_event) against the stream's own buffer.
    pub fn service_rx<D: RxDma + ?Sized>(&mut self, event: RxEvent, dma: &D) -> Result<Absorbed> {
        self.on_rx_event(event, dma.buffer())
    }

    /// The transmit transfer finished.
    pub fn on_tx_complete(&mut self) -> IoResult<()> {
        self.tx_side()?.on_transfer_complete();
        Ok(())
    }

    /// USART interrupt: recover from a line error, or deliver an idle event.
    pub fn on_uart_interrupt<D, W>(
        &mut self,
        status: UartStatus,
        dma: &mut D,
        delay: &mut W,
    ) -> Result<Absorbed>
    where
        D: RxDma + ?Sized,
        W: DelayNs,
    {
        if let Some(error) = status.error() {
            self.recover_rx(error, dma, delay)?;
            return Ok(Absorbed::default());
        }
        match status.idle_event(dma.remaining()) {
            Some(event) => self.service_rx(event, &*dma),
            None => Ok(Absorbed::default()),
        }
    }

    /// Receive DMA interrupt: recover from a transfer error, or deliver the
    /// half and complete events.
    pub fn on_rx_dma_interrupt<D, W>(
        &mut self,
        flags: DmaFlags,
        dma: &mut D,
        delay: &mut W,
    ) -> Result<Absorbed>
    where
        D: RxDma + ?Sized,
        W: DelayNs,
    {
        if let Some(error) = flags.error() {
            self.recover_rx(error, dma, delay)?;
            return Ok(Absorbed::default());
        }
        let mut total = Absorbed::default();
        for event in flags.rx_events() {
            let absorbed = self.service_rx(event, &*dma)?;
            total.copied += absorbed.copied;
            total.stored += absorbed.stored;
        }
        Ok(total)
    }

    /// Restart receive DMA after a line error.
    ///
    /// Bytes the DMA already wrote are absorbed first. The restart is then
    /// retried up to [`RX_RESTART_ATTEMPTS`] times, [`RX_RESTART_DELAY_US`]
    /// apart, and the tracker starts over at the buffer start.
    ///
    /// # Errors
    ///
    /// - [`IoError::NotEnabled`] if receive is off
    /// - [`IoError::RestartFailed`] if every attempt failed
    pub fn recover_rx<D, W>(&mut self, error: LineError, dma: &mut D, delay: &mut W) -> IoResult<()>
    where
        D: RxDma + ?Sized,
        W: DelayNs,
    {
        #[cfg(feature = "defmt")]
        let id = self.id;
        let rx = self.rx_side()?;

        #[cfg(feature = "defmt")]
        defmt::warn!("{}: {}, restarting receive", id, error);
        #[cfg(not(feature = "defmt"))]
        let _ = error;

        // The restart goes ahead whatever the salvage found
        let salvaged = rx.tracker.on_idle(dma.buffer(), dma.remaining());

        #[cfg(feature = "defmt")]
        {
            if let Err(e) = salvaged {
                defmt::warn!("{}: salvage before restart: {}", id, e);
            }
        }
        #[cfg(not(feature = "defmt"))]
        let _ = salvaged;

        for _attempt in 0..RX_RESTART_ATTEMPTS {
            if dma.restart().is_ok() {
                rx.tracker.restart();

                #[cfg(feature = "defmt")]
                defmt::info!("{}: receive restarted after {} attempts", id, _attempt + 1);

                return Ok(());
            }
            delay.delay_us(RX_RESTART_DELAY_US);
        }

        #[cfg(feature = "defmt")]
        defmt::error!("{}: receive restart failed", id);

        Err(IoError::RestartFailed)
    }
}

impl core::fmt::Debug for Port<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("rx", &self.rx())
            .field("tx", &self.tx)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
