//! Error types for the playback engine

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// The host refused to start audible playback (e.g. autoplay policy)
    ///
    /// The engine has rolled back to its previous not-playing state; the
    /// call is retry-safe after a user gesture.
    #[error("Playback blocked by host policy")]
    PlaybackBlocked,

    /// The asset locator could not be resolved into a source
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Audio source error during decode/read
    #[error("Audio source error: {0}")]
    AudioSource(String),

    /// Device output error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<PlaybackError> for chord_core::ChordError {
    fn from(err: PlaybackError) -> Self {
        chord_core::ChordError::playback(err.to_string())
    }
}
