//! Chord Storage
//!
//! `SQLite` persistence for the royalty pipeline: track metadata (including
//! the analyzed playback gain) and the immutable play-event log.
//!
//! # Architecture
//!
//! - **Vertical slicing**: each feature owns its own queries (`tracks`,
//!   `play_events`)
//! - **Append-only accounting**: play events are inserted once and never
//!   updated
//! - [`SqliteRoyaltyStore`] adapts the pool to the report aggregator's
//!   read-side trait
//!
//! # Example
//!
//! ```rust,no_run
//! use chord_storage::{create_pool, run_migrations, tracks};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://chord.db").await?;
//! run_migrations(&pool).await?;
//!
//! let all = tracks::get_by_owner(&pool, &chord_core::UserId::new("u1")).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod royalty;

// Vertical slices
pub mod play_events;
pub mod tracks;

pub use error::StorageError;
pub use royalty::SqliteRoyaltyStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Called once at application start to bring the schema up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://chord.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(pool)
}
