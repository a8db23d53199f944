//! Error types for logtide.

use thiserror::Error;

/// Result type alias for logtide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for logtide.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol errors (malformed wire data)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The input ended before a complete value could be read
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEof(String),

    /// The message carries a compression attribute this codec does not decode
    #[error("Unsupported compression (attributes byte {0})")]
    UnsupportedCompression(i8),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
