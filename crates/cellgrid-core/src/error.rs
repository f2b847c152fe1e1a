//! Error types for cellgrid-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellgrid-core
///
/// Most grid operations degrade to a no-op instead of failing; these errors
/// only come out of the strict parsing and restore boundaries.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Grid shape does not match the declared dimensions
    #[error("Grid shape mismatch: expected {expected_rows}x{expected_columns}, found {detail}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_columns: usize,
        detail: String,
    },

    /// Invalid grid dimensions
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
