//! Error types for the Tokengate limiter.

use thiserror::Error;

/// Main error type for Tokengate operations.
#[derive(Error, Debug)]
pub enum TokengateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single request's weight exceeds the total window capacity.
    ///
    /// No amount of waiting frees enough room for such a request, so it is
    /// surfaced immediately and never retried internally.
    #[error("Request weight {weight} exceeds the window capacity of {capacity} tokens")]
    QuotaUnsatisfiable { weight: u64, capacity: u64 },

    /// An admission wait was abandoned because its deadline elapsed.
    #[error("Admission deadline elapsed before a quota slot freed up")]
    DeadlineExceeded,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tokengate operations.
pub type Result<T> = std::result::Result<T, TokengateError>;
