//! Interrupt status decoding.
//!
//! This module turns the raw USART status register and a DMA channel's
//! interrupt flags into [`UartStatus`] / [`DmaFlags`] values and the
//! [`RxEvent`]s the receive tracker consumes.

use crate::internal::register::dma::{
    ISR_CHANNEL_MASK, ISR_CHANNEL_SHIFT, ISR_GIF, ISR_HTIF, ISR_TCIF, ISR_TEIF, MAX_CHANNEL,
};
use crate::internal::register::usart::{
    SR_ERRORS, SR_FE, SR_IDLE, SR_NE, SR_ORE, SR_PE, SR_RXNE, SR_TC, SR_TXE,
};
use crate::rx::RxEvent;

// =============================================================================
// Line Errors
// =============================================================================

/// Receive error that requires restarting the receive DMA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Parity error
    Parity,
    /// Framing error
    Framing,
    /// Noise detected on the line
    Noise,
    /// Receive overrun
    Overrun,
    /// DMA transfer error
    Dma,
}

impl LineError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineError::Parity => "parity error",
            LineError::Framing => "framing error",
            LineError::Noise => "noise error",
            LineError::Overrun => "overrun",
            LineError::Dma => "DMA transfer error",
        }
    }
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USART Status
// =============================================================================

/// Flags parsed from the USART status register.
///
/// # Example
///
/// ```ignore
/// let status = UartStatus::from_raw(usart.sr());
/// if let Some(error) = status.error() {
///     port.recover_rx(error, &mut rx_dma, &mut delay)?;
/// } else if let Some(event) = status.idle_event(rx_dma.remaining()) {
///     port.service_rx(event, &rx_dma)?;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartStatus {
    /// Parity error
    pub parity_error: bool,
    /// Framing error
    pub framing_error: bool,
    /// Noise detected
    pub noise: bool,
    /// Receive overrun
    pub overrun: bool,
    /// Line went idle
    pub idle: bool,
    /// Receive data register not empty
    pub rx_not_empty: bool,
    /// Transmission complete
    pub tx_complete: bool,
    /// Transmit data register empty
    pub tx_empty: bool,
}

impl UartStatus {
    /// Create from raw status register value
    #[inline]
    pub fn from_raw(sr: u32) -> Self {
        Self {
            parity_error: (sr & SR_PE) != 0,
            framing_error: (sr & SR_FE) != 0,
            noise: (sr & SR_NE) != 0,
            overrun: (sr & SR_ORE) != 0,
            idle: (sr & SR_IDLE) != 0,
            rx_not_empty: (sr & SR_RXNE) != 0,
            tx_complete: (sr & SR_TC) != 0,
            tx_empty: (sr & SR_TXE) != 0,
        }
    }

    /// Convert back to the register layout
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.parity_error {
            val |= SR_PE;
        }
        if self.framing_error {
            val |= SR_FE;
        }
        if self.noise {
            val |= SR_NE;
        }
        if self.overrun {
            val |= SR_ORE;
        }
        if self.idle {
            val |= SR_IDLE;
        }
        if self.rx_not_empty {
            val |= SR_RXNE;
        }
        if self.tx_complete {
            val |= SR_TC;
        }
        if self.tx_empty {
            val |= SR_TXE;
        }
        val
    }

    /// Check if any line error is flagged
    #[inline]
    pub fn has_error(&self) -> bool {
        self.to_raw() & SR_ERRORS != 0
    }

    /// The most significant flagged line error.
    ///
    /// Overrun wins since it means bytes were lost outright.
    pub fn error(&self) -> Option<LineError> {
        if self.overrun {
            Some(LineError::Overrun)
        } else if self.framing_error {
            Some(LineError::Framing)
        } else if self.parity_error {
            Some(LineError::Parity)
        } else if self.noise {
            Some(LineError::Noise)
        } else {
            None
        }
    }

    /// The idle-line event, if the idle flag is set
    #[inline]
    pub fn idle_event(&self, remaining: usize) -> Option<RxEvent> {
        self.idle.then_some(RxEvent::Idle { remaining })
    }
}

// =============================================================================
// DMA Channel Flags
// =============================================================================

/// One DMA channel's interrupt flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaFlags {
    /// Global interrupt (any of the below)
    pub global: bool,
    /// Transfer complete
    pub transfer_complete: bool,
    /// Half transfer
    pub half_transfer: bool,
    /// Transfer error
    pub transfer_error: bool,
}

impl DmaFlags {
    /// Create from a channel's 4-bit flag field
    #[inline]
    pub fn from_raw(bits: u32) -> Self {
        Self {
            global: (bits & ISR_GIF) != 0,
            transfer_complete: (bits & ISR_TCIF) != 0,
            half_transfer: (bits & ISR_HTIF) != 0,
            transfer_error: (bits & ISR_TEIF) != 0,
        }
    }

    /// Extract channel `channel` (1-based) from the controller's ISR word.
    ///
    /// Returns `None` for channel numbers the controller does not have.
    pub fn from_isr(isr: u32, channel: u8) -> Option<Self> {
        let shift = Self::shift(channel)?;
        Some(Self::from_raw((isr >> shift) & ISR_CHANNEL_MASK))
    }

    /// Convert to the 4-bit field layout
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.global {
            val |= ISR_GIF;
        }
        if self.transfer_complete {
            val |= ISR_TCIF;
        }
        if self.half_transfer {
            val |= ISR_HTIF;
        }
        if self.transfer_error {
            val |= ISR_TEIF;
        }
        val
    }

    /// Value for the IFCR register that clears exactly these flags on
    /// `channel`.
    pub fn clear_mask(&self, channel: u8) -> Option<u32> {
        Some(self.to_raw() << Self::shift(channel)?)
    }

    /// Receive events signalled by these flags, half before complete.
    ///
    /// A late service can see both set at once; absorbing them in this
    /// order keeps the tail position non-decreasing.
    pub fn rx_events(&self) -> impl Iterator<Item = RxEvent> {
        [
            self.half_transfer.then_some(RxEvent::HalfTransfer),
            self.transfer_complete.then_some(RxEvent::TransferComplete),
        ]
        .into_iter()
        .flatten()
    }

    /// The transfer error as a line error, if flagged
    #[inline]
    pub fn error(&self) -> Option<LineError> {
        self.transfer_error.then_some(LineError::Dma)
    }

    fn shift(channel: u8) -> Option<u32> {
        if channel == 0 || channel > MAX_CHANNEL {
            return None;
        }
        Some(ISR_CHANNEL_SHIFT * (channel as u32 - 1))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn uart_status_from_raw_zero() {
        let status = UartStatus::from_raw(0);
        assert_eq!(status, UartStatus::default());
        assert!(!status.has_error());
        assert_eq!(status.error(), None);
        assert_eq!(status.idle_event(5), None);
    }

    #[test]
    fn uart_status_round_trip_of_known_bits() {
        let raw = SR_IDLE | SR_TC | SR_TXE;
        let status = UartStatus::from_raw(raw);
        assert!(status.idle);
        assert!(status.tx_complete);
        assert!(status.tx_empty);
        assert_eq!(status.to_raw(), raw);
        // Unknown bits are dropped
        assert_eq!(UartStatus::from_raw(raw | 1 << 9).to_raw(), raw);
    }

    #[test]
    fn uart_status_error_priority() {
        assert_eq!(
            UartStatus::from_raw(SR_PE | SR_ORE).error(),
            Some(LineError::Overrun)
        );
        assert_eq!(
            UartStatus::from_raw(SR_NE | SR_FE).error(),
            Some(LineError::Framing)
        );
        assert_eq!(UartStatus::from_raw(SR_NE).error(), Some(LineError::Noise));
        assert!(UartStatus::from_raw(SR_PE).has_error());
    }

    #[test]
    fn uart_status_idle_event_carries_remaining() {
        let status = UartStatus::from_raw(SR_IDLE | SR_RXNE);
        assert_eq!(status.idle_event(42), Some(RxEvent::Idle { remaining: 42 }));
    }

    #[test]
    fn dma_flags_from_isr_selects_channel() {
        // Channel 5: HTIF + GIF, channel 4: TCIF
        let isr = ((ISR_GIF | ISR_HTIF) << 16) | (ISR_TCIF << 12);

        let ch5 = DmaFlags::from_isr(isr, 5).unwrap();
        assert!(ch5.global);
        assert!(ch5.half_transfer);
        assert!(!ch5.transfer_complete);

        let ch4 = DmaFlags::from_isr(isr, 4).unwrap();
        assert!(ch4.transfer_complete);
        assert!(!ch4.global);

        assert_eq!(DmaFlags::from_isr(isr, 0), None);
        assert_eq!(DmaFlags::from_isr(isr, 8), None);
    }

    #[test]
    fn dma_flags_clear_mask_matches_position() {
        let flags = DmaFlags::from_raw(ISR_GIF | ISR_TCIF);
        assert_eq!(flags.clear_mask(1), Some(0b0011));
        assert_eq!(flags.clear_mask(3), Some(0b0011 << 8));
        assert_eq!(flags.clear_mask(9), None);
    }

    #[test]
    fn dma_flags_rx_events_half_first() {
        let both = DmaFlags::from_raw(ISR_GIF | ISR_HTIF | ISR_TCIF);
        let events: Vec<RxEvent> = both.rx_events().collect();
        assert_eq!(
            events,
            [RxEvent::HalfTransfer, RxEvent::TransferComplete]
        );

        let none = DmaFlags::from_raw(ISR_GIF);
        assert_eq!(none.rx_events().count(), 0);
    }

    #[test]
    fn dma_flags_transfer_error() {
        assert_eq!(
            DmaFlags::from_raw(ISR_TEIF).error(),
            Some(LineError::Dma)
        );
        assert_eq!(DmaFlags::from_raw(ISR_TCIF).error(), None);
    }
}
