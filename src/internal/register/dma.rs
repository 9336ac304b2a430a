//! DMA Interrupt Status Register (DMA_ISR) Bits
//!
//! Each channel owns a 4-bit field; channel `n` (1-based) starts at bit
//! `4 * (n - 1)`. The constants below are offsets within that field.

/// Global interrupt flag
pub const ISR_GIF: u32 = 1 << 0;
/// Transfer complete flag
pub const ISR_TCIF: u32 = 1 << 1;
/// Half transfer flag
pub const ISR_HTIF: u32 = 1 << 2;
/// Transfer error flag
pub const ISR_TEIF: u32 = 1 << 3;

/// Mask of one channel's field
pub const ISR_CHANNEL_MASK: u32 = 0xF;

/// Width of one channel's field in bits
pub const ISR_CHANNEL_SHIFT: u32 = 4;

/// Highest channel number on one controller
pub const MAX_CHANNEL: u8 = 7;
