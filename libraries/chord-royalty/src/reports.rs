//! Report aggregation
//!
//! Turns the play-event log into per-track summaries for an inclusive
//! closed date range. Track metadata joins at report time, not at event
//! time: reports always show present-day titles and credits, a deliberate
//! staleness/simplicity tradeoff.

use crate::error::Result;
use async_trait::async_trait;
use chord_core::{PlayEvent, Report, Track, TrackId, TrackReportRow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Read side of the royalty pipeline
#[async_trait]
pub trait RoyaltyStore: Send + Sync {
    /// All play events within the inclusive range `[start, end]`
    async fn play_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PlayEvent>>;

    /// Current metadata for one track (`None` when the track is gone)
    async fn track(&self, id: &TrackId) -> Result<Option<Track>>;
}

/// Aggregates play events into a [`Report`]
#[derive(Debug)]
pub struct ReportAggregator<S> {
    store: S,
}

impl<S: RoyaltyStore> ReportAggregator<S> {
    /// Create an aggregator over a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Generate a report for the inclusive period `[period_start, period_end]`
    ///
    /// Rows appear in first-encountered order; zero matching events yields
    /// a valid empty report. Presentation sorting belongs to exporters.
    ///
    /// # Errors
    /// Propagates store failures
    pub async fn generate_report(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Report> {
        let events = self
            .store
            .play_events_between(period_start, period_end)
            .await?;

        let mut per_track: Vec<TrackReportRow> = Vec::new();
        let mut row_index: HashMap<TrackId, usize> = HashMap::new();
        let mut total_plays = 0_u64;

        for event in events
            .iter()
            .filter(|e| e.timestamp >= period_start && e.timestamp <= period_end)
        {
            total_plays += 1;

            let index = match row_index.get(&event.track_id) {
                Some(&index) => index,
                None => {
                    let row = self.new_row(event).await?;
                    per_track.push(row);
                    let index = per_track.len() - 1;
                    row_index.insert(event.track_id.clone(), index);
                    index
                }
            };

            let row = &mut per_track[index];
            row.total_plays += 1;
            if event.counted {
                row.counted_plays += 1;
            }
            if event.timestamp < row.first_play {
                row.first_play = event.timestamp;
            }
            if event.timestamp > row.last_play {
                row.last_play = event.timestamp;
            }
        }

        Ok(Report {
            period_start,
            period_end,
            generated_at: Utc::now(),
            total_plays,
            per_track,
        })
    }

    /// Build an empty row for a first-encountered track
    ///
    /// Joins current metadata; a removed track still reports, with
    /// placeholder credits, rather than failing the whole report.
    async fn new_row(&self, event: &PlayEvent) -> Result<TrackReportRow> {
        let (title, composer, writers, isrc_code) = match self.store.track(&event.track_id).await? {
            Some(track) => (
                track.title.clone(),
                track.composer.clone(),
                track.credited_writers(),
                track.isrc_code.clone(),
            ),
            None => {
                let unknown = "(unknown)".to_string();
                (unknown.clone(), unknown.clone(), vec![unknown], None)
            }
        };

        Ok(TrackReportRow {
            track_id: event.track_id.clone(),
            title,
            composer,
            writers,
            isrc_code,
            total_plays: 0,
            counted_plays: 0,
            first_play: event.timestamp,
            last_play: event.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::{SessionId, UserId};
    use chrono::TimeZone;

    /// In-memory store for aggregator tests
    #[derive(Default)]
    struct MemoryStore {
        events: Vec<PlayEvent>,
        tracks: Vec<Track>,
    }

    #[async_trait]
    impl RoyaltyStore for MemoryStore {
        async fn play_events_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<PlayEvent>> {
            Ok(self
                .events
                .iter()
                .filter(|e| e.timestamp >= start && e.timestamp <= end)
                .cloned()
                .collect())
        }

        async fn track(&self, id: &TrackId) -> Result<Option<Track>> {
            Ok(self.tracks.iter().find(|t| &t.id == id).cloned())
        }
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn event(track: &Track, timestamp: DateTime<Utc>, counted: bool) -> PlayEvent {
        PlayEvent {
            id: None,
            track_id: track.id.clone(),
            user_id: UserId::new("listener"),
            timestamp,
            seconds_listened: if counted { 45.0 } else { 5.0 },
            percent_listened: if counted { 60.0 } else { 4.0 },
            session_id: SessionId::new("s1"),
            counted,
        }
    }

    fn track(title: &str, composer: &str) -> Track {
        Track::new(UserId::new("owner"), title, composer, "assets/a.flac")
    }

    #[tokio::test]
    async fn aggregates_per_track_totals() {
        let track_a = track("Alpha", "Composer A");
        let track_b = track("Beta", "Composer B");

        let store = MemoryStore {
            events: vec![
                event(&track_a, ts(10, 9), true),
                event(&track_a, ts(11, 9), true),
                event(&track_a, ts(12, 9), false),
                event(&track_b, ts(11, 15), true),
            ],
            tracks: vec![track_a.clone(), track_b.clone()],
        };

        let report = ReportAggregator::new(store)
            .generate_report(ts(1, 0), ts(30, 0))
            .await
            .unwrap();

        assert_eq!(report.total_plays, 4);
        assert_eq!(report.per_track.len(), 2);

        // First-encountered order
        assert_eq!(report.per_track[0].track_id, track_a.id);
        assert_eq!(report.per_track[0].total_plays, 3);
        assert_eq!(report.per_track[0].counted_plays, 2);
        assert_eq!(report.per_track[0].first_play, ts(10, 9));
        assert_eq!(report.per_track[0].last_play, ts(12, 9));

        assert_eq!(report.per_track[1].track_id, track_b.id);
        assert_eq!(report.per_track[1].total_plays, 1);
        assert_eq!(report.per_track[1].counted_plays, 1);
    }

    #[tokio::test]
    async fn period_boundaries_are_inclusive() {
        let t = track("Edge", "Composer");
        let start = ts(10, 0);
        let end = ts(20, 0);

        let store = MemoryStore {
            events: vec![
                event(&t, start, true),               // exactly at start
                event(&t, end, true),                 // exactly at end
                event(&t, ts(9, 23), true),           // before
                event(&t, ts(20, 1), true),           // after
            ],
            tracks: vec![t.clone()],
        };

        let report = ReportAggregator::new(store)
            .generate_report(start, end)
            .await
            .unwrap();

        assert_eq!(report.total_plays, 2);
        assert_eq!(report.per_track[0].first_play, start);
        assert_eq!(report.per_track[0].last_play, end);
    }

    #[tokio::test]
    async fn empty_range_yields_valid_empty_report() {
        let store = MemoryStore::default();
        let report = ReportAggregator::new(store)
            .generate_report(ts(1, 0), ts(2, 0))
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.total_plays, 0);
        assert!(report.per_track.is_empty());
    }

    #[tokio::test]
    async fn metadata_joins_at_report_time() {
        let mut t = track("Old Title", "Composer");
        let e = event(&t, ts(10, 9), true);

        // The track was renamed after the play happened
        t.title = "New Title".to_string();

        let store = MemoryStore {
            events: vec![e],
            tracks: vec![t],
        };

        let report = ReportAggregator::new(store)
            .generate_report(ts(1, 0), ts(30, 0))
            .await
            .unwrap();

        assert_eq!(report.per_track[0].title, "New Title");
    }

    #[tokio::test]
    async fn missing_track_reports_with_placeholder() {
        let t = track("Gone", "Composer");
        let store = MemoryStore {
            events: vec![event(&t, ts(10, 9), true)],
            tracks: vec![], // deleted with its owner
        };

        let report = ReportAggregator::new(store)
            .generate_report(ts(1, 0), ts(30, 0))
            .await
            .unwrap();

        assert_eq!(report.per_track.len(), 1);
        assert_eq!(report.per_track[0].title, "(unknown)");
        assert_eq!(report.per_track[0].counted_plays, 1);
    }

    #[tokio::test]
    async fn writers_default_to_composer() {
        let t = track("Solo", "Only Composer");
        let store = MemoryStore {
            events: vec![event(&t, ts(10, 9), true)],
            tracks: vec![t],
        };

        let report = ReportAggregator::new(store)
            .generate_report(ts(1, 0), ts(30, 0))
            .await
            .unwrap();

        assert_eq!(report.per_track[0].writers, vec!["Only Composer".to_string()]);
    }
}
