//! Error types for royalty accounting

use thiserror::Error;

/// Result type alias using `RoyaltyError`
pub type Result<T> = std::result::Result<T, RoyaltyError>;

/// Royalty accounting errors
#[derive(Debug, Error)]
pub enum RoyaltyError {
    /// A play event could not be persisted
    ///
    /// The recorder's accumulator resets regardless; the event may be lost
    /// (accepted lossy tradeoff).
    #[error("Failed to persist play event: {0}")]
    Persistence(String),

    /// The report store failed
    #[error("Royalty store error: {0}")]
    Store(String),
}

impl From<RoyaltyError> for chord_core::ChordError {
    fn from(err: RoyaltyError) -> Self {
        chord_core::ChordError::royalty(err.to_string())
    }
}
