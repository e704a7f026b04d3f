/// Core error types for Chord
use thiserror::Error;

/// Result type alias using `ChordError`
pub type Result<T> = std::result::Result<T, ChordError>;

/// Core error type for Chord
#[derive(Error, Debug)]
pub enum ChordError {
    /// Audio decoding/playback errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Playback engine errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Royalty accounting errors
    #[error("Royalty error: {0}")]
    Royalty(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ChordError {
    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a royalty accounting error
    pub fn royalty(msg: impl Into<String>) -> Self {
        Self::Royalty(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ChordError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
