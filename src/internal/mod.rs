//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//!
//! # Contents
//!
//! - [`register`]: Status register bit definitions
//! - [`constants`]: Default sizes and limits
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Its contents may change
//! without notice.

pub(crate) mod constants;
pub(crate) mod register;
