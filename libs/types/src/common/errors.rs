//! Error types for identifier validation

use thiserror::Error;

/// Rejected identifier input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// ID value is null/zero when non-null required
    #[error("ID cannot be null/zero")]
    NullId,

    /// Byte identity has the wrong length
    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Invalid textual format for identifier creation
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
