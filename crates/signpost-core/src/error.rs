use thiserror::Error;

/// Result type for rule lookups.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Reasons a rule lookup did not produce an answer.
///
/// The resolver treats every variant the same way (as "no rule"); the
/// distinction only shows up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("rule source unavailable: {0}")]
    Unavailable(String),
    #[error("rule lookup timed out: {0}")]
    Timeout(String),
    #[error("rule source responded with status {0}")]
    Status(u16),
    #[error("rule source returned invalid data: {0}")]
    InvalidData(String),
}
