/// Ephemeral playback-session types
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Loop mode for the playback session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Stop when the track ends
    #[default]
    Off,

    /// Restart the queue when it ends
    All,

    /// Repeat the current track
    One,
}

/// Snapshot of the process-local playback session
///
/// Created on the first playback request, mutated by transport controls,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Currently loaded track, if any
    pub current_track: Option<TrackId>,

    /// Whether audio is currently playing
    pub is_playing: bool,

    /// Playback position in seconds
    pub position_seconds: f64,

    /// Track duration in seconds (`None` when unknown)
    pub duration_seconds: Option<f64>,

    /// Volume in [0.0, 1.0]
    pub volume: f32,

    /// Mute state (preserves the volume level)
    pub muted: bool,

    /// Loop mode
    pub loop_mode: LoopMode,

    /// Shuffle flag
    pub shuffle: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: None,
            volume: 1.0,
            muted: false,
            loop_mode: LoopMode::Off,
            shuffle: false,
        }
    }
}
