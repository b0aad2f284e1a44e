//! Error types returned by the helpers.

/// Errors produced by the HTTP helpers.
///
/// Only date formatting can fail; IP matching and cookie deduplication
/// never return errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelperError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl HelperError {
    /// Build an `InvalidTimestamp` error from anything printable
    pub fn invalid_timestamp(input: impl std::fmt::Display) -> Self {
        HelperError::InvalidTimestamp(input.to_string())
    }
}
