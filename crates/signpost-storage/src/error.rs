use thiserror::Error;

/// Result type for setting up a rule source.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised while constructing or loading a rule source.
///
/// Per-request lookup failures are reported as
/// [`LookupError`](signpost_core::LookupError) instead.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),
    #[error("rule data is invalid: {0}")]
    InvalidData(String),
    #[error("invalid rule source endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}
