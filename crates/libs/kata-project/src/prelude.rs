//! Common types and utilities.

/// Project error type.
pub use crate::error::Error;

/// Project result type.
pub type Result<T> = core::result::Result<T, Error>;
