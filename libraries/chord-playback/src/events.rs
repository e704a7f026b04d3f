//! Playback Events
//!
//! Event-based communication with the engine's one subscriber. Events are
//! emitted at key points:
//! - Track load (with the initial position-0 update)
//! - State changes (play/pause/stop/ended)
//! - Position updates (every tick while playing)
//! - Exactly one terminal ended signal per track

use chord_core::TrackId;
use serde::{Deserialize, Serialize};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No track loaded
    Idle,

    /// Track bound, not playing, position 0 or wherever stop left it
    Loaded,

    /// Producing audio
    Playing,

    /// Paused mid-track
    Paused,

    /// Current track ran to its natural end
    Ended,
}

/// Events emitted by the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A track was bound to the engine (begins a new occupancy of the
    /// current-track slot)
    TrackLoaded {
        /// The newly bound track
        track_id: TrackId,
        /// Track duration in seconds, when the source knows it
        duration_seconds: Option<f64>,
    },

    /// Engine state changed
    StateChanged {
        /// The new state
        state: EngineState,
    },

    /// Periodic position update (every tick, and once at load with
    /// position 0)
    PositionUpdate {
        /// Current playback position in seconds
        position_seconds: f64,
        /// Track duration in seconds, when known
        duration_seconds: Option<f64>,
    },

    /// The current track finished naturally (exactly once per track)
    TrackEnded {
        /// The track that ended
        track_id: TrackId,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Volume in [0.0, 1.0]
        volume: f32,
        /// Whether audio is muted
        muted: bool,
    },
}

/// The engine's single subscriber
///
/// Registering a new observer replaces the previous one; subscribers never
/// accumulate. Calls are synchronous on the engine's caller thread, so an
/// ended flush completes before any subsequent load.
pub trait EngineObserver: Send {
    /// Receive one engine event
    fn on_event(&mut self, event: &EngineEvent);
}
