//! Read-side adapter for the report aggregator

use crate::{play_events, tracks};
use async_trait::async_trait;
use chord_core::{PlayEvent, Track, TrackId};
use chord_royalty::{RoyaltyError, RoyaltyStore};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// `SQLite`-backed royalty store
///
/// Wraps the pool so `chord_royalty::ReportAggregator` can read events and
/// join current track metadata.
#[derive(Debug, Clone)]
pub struct SqliteRoyaltyStore {
    pool: SqlitePool,
}

impl SqliteRoyaltyStore {
    /// Create a store over an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Borrow the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RoyaltyStore for SqliteRoyaltyStore {
    async fn play_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> chord_royalty::Result<Vec<PlayEvent>> {
        play_events::get_between(&self.pool, start, end)
            .await
            .map_err(|e| RoyaltyError::Store(e.to_string()))
    }

    async fn track(&self, id: &TrackId) -> chord_royalty::Result<Option<Track>> {
        tracks::get_by_id(&self.pool, id)
            .await
            .map_err(|e| RoyaltyError::Store(e.to_string()))
    }
}
