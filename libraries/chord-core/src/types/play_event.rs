/// Play event and report types
use crate::types::{SessionId, TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded listen
///
/// Created exactly once per continuous occupancy of the current-track slot,
/// immutable after creation, retained indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Storage row ID (`None` before the event has been persisted)
    pub id: Option<i64>,

    /// The track that was listened to
    pub track_id: TrackId,

    /// The listening user
    pub user_id: UserId,

    /// When the listen ended
    pub timestamp: DateTime<Utc>,

    /// Seconds of actual playback (paused intervals never accrue)
    pub seconds_listened: f64,

    /// Listened share of the track duration, in percent
    ///
    /// Not capped at 100 (looped listens can exceed the track length);
    /// 0.0 when the duration was unknown.
    pub percent_listened: f64,

    /// Client session the listen belongs to
    pub session_id: SessionId,

    /// Whether the listen met the royalty crediting threshold
    pub counted: bool,
}

/// Per-track aggregation row within a [`Report`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReportRow {
    /// The aggregated track
    pub track_id: TrackId,

    /// Current track title (joined at report time)
    pub title: String,

    /// Current composer credit
    pub composer: String,

    /// Writer credits (composer fallback already applied)
    pub writers: Vec<String>,

    /// ISRC code, when registered
    pub isrc_code: Option<String>,

    /// All plays of this track within the period
    pub total_plays: u64,

    /// Plays meeting the crediting threshold
    pub counted_plays: u64,

    /// Earliest in-range play
    pub first_play: DateTime<Utc>,

    /// Latest in-range play
    pub last_play: DateTime<Utc>,
}

/// Aggregated royalty report over a closed date range
///
/// Derived on demand from the play-event log and current track metadata;
/// never persisted or cached beyond one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Inclusive period start
    pub period_start: DateTime<Utc>,

    /// Inclusive period end
    pub period_end: DateTime<Utc>,

    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Count of all in-range play events
    pub total_plays: u64,

    /// Per-track rows in first-encountered order
    ///
    /// Presentation ordering is the exporter's concern.
    pub per_track: Vec<TrackReportRow>,
}

impl Report {
    /// Total counted plays across all tracks
    pub fn counted_plays(&self) -> u64 {
        self.per_track.iter().map(|row| row.counted_plays).sum()
    }

    /// Whether the period matched no events
    pub fn is_empty(&self) -> bool {
        self.total_plays == 0
    }
}
