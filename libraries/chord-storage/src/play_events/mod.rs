use chord_core::{error::Result, PlayEvent};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

fn map_event(row: &sqlx::sqlite::SqliteRow) -> PlayEvent {
    PlayEvent {
        id: Some(row.get("id")),
        track_id: row.get("track_id"),
        user_id: row.get("user_id"),
        timestamp: row.get("timestamp"),
        seconds_listened: row.get("seconds_listened"),
        percent_listened: row.get("percent_listened"),
        session_id: row.get("session_id"),
        counted: row.get("counted"),
    }
}

/// Append one immutable play event, returning its row ID
pub async fn insert(pool: &SqlitePool, event: &PlayEvent) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO play_events (track_id, user_id, timestamp, seconds_listened,
                                  percent_listened, session_id, counted)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.track_id)
    .bind(&event.user_id)
    .bind(event.timestamp)
    .bind(event.seconds_listened)
    .bind(event.percent_listened)
    .bind(&event.session_id)
    .bind(event.counted)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Play events within the inclusive closed range `[start, end]`
pub async fn get_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PlayEvent>> {
    let rows = sqlx::query(
        "SELECT id, track_id, user_id, timestamp, seconds_listened,
                percent_listened, session_id, counted
         FROM play_events
         WHERE timestamp >= ? AND timestamp <= ?
         ORDER BY timestamp, id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_event).collect())
}

/// Total number of stored play events
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as n FROM play_events")
        .fetch_one(pool)
        .await?;

    Ok(row.get("n"))
}
