//! Common types and utilities.

/// Process and work-folder error type.
pub use crate::error::Error;

/// Process and work-folder result type.
pub type Result<T> = core::result::Result<T, Error>;
