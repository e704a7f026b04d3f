use chord_core::{error::Result, TrackId, Track, UserId};
use sqlx::{Row, SqlitePool};

fn map_track(row: &sqlx::sqlite::SqliteRow) -> Track {
    let writers_json: String = row.get("writers");
    Track {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        composer: row.get("composer"),
        writers: serde_json::from_str(&writers_json).unwrap_or_default(),
        duration_seconds: row.get("duration_seconds"),
        gain_db: row.get("gain_db"),
        isrc_code: row.get("isrc_code"),
        tempo_bpm: row.get("tempo_bpm"),
        audio_asset_ref: row.get("audio_asset_ref"),
        created_at: row.get("created_at"),
    }
}

pub async fn insert(pool: &SqlitePool, track: &Track) -> Result<()> {
    let writers_json = serde_json::to_string(&track.writers)?;

    sqlx::query(
        "INSERT INTO tracks (id, owner_id, title, composer, writers, duration_seconds,
                             gain_db, isrc_code, tempo_bpm, audio_asset_ref, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&track.id)
    .bind(&track.owner_id)
    .bind(&track.title)
    .bind(&track.composer)
    .bind(&writers_json)
    .bind(track.duration_seconds)
    .bind(track.gain_db)
    .bind(&track.isrc_code)
    .bind(track.tempo_bpm)
    .bind(&track.audio_asset_ref)
    .bind(track.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(
        "SELECT id, owner_id, title, composer, writers, duration_seconds,
                gain_db, isrc_code, tempo_bpm, audio_asset_ref, created_at
         FROM tracks
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| map_track(&row)))
}

pub async fn get_by_owner(pool: &SqlitePool, owner_id: &UserId) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        "SELECT id, owner_id, title, composer, writers, duration_seconds,
                gain_db, isrc_code, tempo_bpm, audio_asset_ref, created_at
         FROM tracks
         WHERE owner_id = ?
         ORDER BY created_at",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_track).collect())
}

/// Write the analyzed gain for a freshly uploaded track
///
/// The gain is write-once: an already-analyzed track is left untouched
/// until [`replace_asset`] clears it. Returns whether a row was written.
pub async fn set_gain(pool: &SqlitePool, id: &TrackId, gain_db: f64) -> Result<bool> {
    let result = sqlx::query("UPDATE tracks SET gain_db = ? WHERE id = ? AND gain_db IS NULL")
        .bind(gain_db)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Store the detected tempo for a track (0 BPM from the detector means
/// undetected and is stored as NULL)
pub async fn set_tempo(pool: &SqlitePool, id: &TrackId, tempo_bpm: f64) -> Result<()> {
    let tempo = (tempo_bpm > 0.0).then_some(tempo_bpm);
    sqlx::query("UPDATE tracks SET tempo_bpm = ? WHERE id = ?")
        .bind(tempo)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Swap in a re-uploaded asset
///
/// Clears the analyzed gain and tempo so the new payload gets analyzed
/// from scratch.
pub async fn replace_asset(pool: &SqlitePool, id: &TrackId, audio_asset_ref: &str) -> Result<()> {
    sqlx::query(
        "UPDATE tracks SET audio_asset_ref = ?, gain_db = NULL, tempo_bpm = NULL WHERE id = ?",
    )
    .bind(audio_asset_ref)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<()> {
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove every track owned by a user (user-deletion cascade)
pub async fn delete_by_owner(pool: &SqlitePool, owner_id: &UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tracks WHERE owner_id = ?")
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
