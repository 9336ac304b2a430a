//! Register bit definitions
//!
//! Only the status words the transport decodes are described here. Reading
//! and clearing them is left to the board support code.

pub(crate) mod dma;
pub(crate) mod usart;
