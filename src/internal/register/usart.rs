//! USART Status Register (USART_SR) Bits

/// Parity error
pub const SR_PE: u32 = 1 << 0;
/// Framing error
pub const SR_FE: u32 = 1 << 1;
/// Noise detected
pub const SR_NE: u32 = 1 << 2;
/// Overrun error
pub const SR_ORE: u32 = 1 << 3;
/// Idle line detected
pub const SR_IDLE: u32 = 1 << 4;
/// Read data register not empty
pub const SR_RXNE: u32 = 1 << 5;
/// Transmission complete
pub const SR_TC: u32 = 1 << 6;
/// Transmit data register empty
pub const SR_TXE: u32 = 1 << 7;

/// All line error bits
pub const SR_ERRORS: u32 = SR_PE | SR_FE | SR_NE | SR_ORE;
