//! Structured error types for the signal detection toolkit.

use thiserror::Error;

/// Unified error type for all SDT operations.
#[derive(Debug, Error)]
pub enum SdtError {
    /// Invalid input (negative counts, bad renderer settings, etc.)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation needing at least one condition found none
    #[error("no conditions: {0}")]
    EmptyCollection(String),

    /// Too few conditions to bound the requested quantity
    #[error("insufficient conditions: {0}")]
    InsufficientData(String),

    /// I/O error while writing rendered output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the toolkit.
pub type Result<T> = std::result::Result<T, SdtError>;
