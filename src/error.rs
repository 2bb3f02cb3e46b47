//! Error types for zkauth.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the client workflows.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected locally; no request was made.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request never produced a response (connectivity, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Service {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, when present.
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Clipboard write failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local input validation failures.
///
/// The `Display` text is what the screens render inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required input is empty.
    #[error("{0}")]
    MissingInput(&'static str),

    /// The selected file exceeds the upload limit.
    #[error("File size must be less than 10MB")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
    },

    /// The author address is not `0x` followed by 64 characters.
    #[error("Please enter a valid Starknet address (0x followed by 64 hex characters)")]
    InvalidAddress,

    /// The verify query does not start with `0x`.
    #[error("Hash must start with 0x")]
    InvalidHashFormat,
}
