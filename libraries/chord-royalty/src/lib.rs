//! Chord - Royalty Accounting
//!
//! Performance-rights accounting over the playback engine's event stream:
//!
//! - [`PlayEventRecorder`] observes the engine, accumulates listened time
//!   per occupancy of the current-track slot, applies the crediting rule,
//!   and persists one immutable [`chord_core::PlayEvent`] per listen
//! - [`ReportAggregator`] turns the event log plus current track metadata
//!   into per-track summaries for an inclusive date range
//! - [`export`] renders an aggregated report as text or CSV (presentation
//!   only)
//!
//! A listen is **counted** (eligible for royalty reporting) when it
//! reaches [`MIN_COUNTED_SECONDS`] of playback or [`MIN_COUNTED_PERCENT`]
//! of the track, whichever comes first.

#![deny(unsafe_code)]

mod error;
pub mod export;
mod recorder;
mod reports;

pub use error::{Result, RoyaltyError};
pub use recorder::{
    is_counted, percent_listened, BufferedEventSink, Clock, MonotonicClock, PlayEventRecorder,
    PlayEventSink,
};
pub use reports::{ReportAggregator, RoyaltyStore};

/// Seconds of playback that make a listen counted on their own
pub const MIN_COUNTED_SECONDS: f64 = 30.0;

/// Percentage of the track that makes a listen counted on its own
pub const MIN_COUNTED_PERCENT: f64 = 50.0;
