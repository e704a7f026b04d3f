/// Track domain type
use crate::types::{TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Uploaded audio track
///
/// Owned by the uploading user and destroyed with that user. `gain_db` is
/// written once by gain analysis at upload time and only changes when the
/// asset is re-uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Uploading user (owner)
    pub owner_id: UserId,

    /// Track title
    pub title: String,

    /// Composer credit
    pub composer: String,

    /// Writer credits (may be empty; reporting falls back to the composer)
    pub writers: Vec<String>,

    /// Track duration in seconds
    pub duration_seconds: f64,

    /// Playback gain toward the target loudness, in dB
    ///
    /// `None` until analysis has run. When present, always within the
    /// supported gain range, including the decode-failure fallback of 0.0.
    pub gain_db: Option<f64>,

    /// ISRC code, when registered
    pub isrc_code: Option<String>,

    /// Detected tempo in BPM (`None` when undetected)
    pub tempo_bpm: Option<f64>,

    /// Locator for the stored audio asset
    pub audio_asset_ref: String,

    /// When the track was uploaded
    pub created_at: DateTime<Utc>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        composer: impl Into<String>,
        audio_asset_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            owner_id,
            title: title.into(),
            composer: composer.into(),
            writers: Vec::new(),
            duration_seconds: 0.0,
            gain_db: None,
            isrc_code: None,
            tempo_bpm: None,
            audio_asset_ref: audio_asset_ref.into(),
            created_at: Utc::now(),
        }
    }

    /// Get the track duration as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds.max(0.0))
    }

    /// Writer credits for reporting
    ///
    /// Falls back to the composer when no writers are registered.
    pub fn credited_writers(&self) -> Vec<String> {
        if self.writers.is_empty() {
            vec![self.composer.clone()]
        } else {
            self.writers.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_creation() {
        let track = Track::new(UserId::generate(), "Test Song", "C. Writer", "assets/a.flac");
        assert_eq!(track.title, "Test Song");
        assert_eq!(track.composer, "C. Writer");
        assert!(track.gain_db.is_none());
        assert!(track.tempo_bpm.is_none());
    }

    #[test]
    fn credited_writers_fall_back_to_composer() {
        let mut track = Track::new(UserId::generate(), "Song", "Composer", "assets/s.flac");
        assert_eq!(track.credited_writers(), vec!["Composer".to_string()]);

        track.writers = vec!["W. One".to_string(), "W. Two".to_string()];
        assert_eq!(track.credited_writers().len(), 2);
    }

    #[test]
    fn track_duration_conversion() {
        let mut track = Track::new(UserId::generate(), "Song", "Composer", "assets/s.flac");
        track.duration_seconds = 180.0;
        assert_eq!(track.duration(), Duration::from_secs(180));
    }
}
