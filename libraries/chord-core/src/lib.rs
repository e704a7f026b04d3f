//! Chord Core
//!
//! Platform-agnostic core types, traits, and error handling for Chord.
//!
//! This crate provides the foundational building blocks shared by the
//! loudness-analysis, playback, and royalty-accounting crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlayEvent`, `Report`, `PlaybackSession`
//! - **Core Traits**: `AudioDecoder`, `AudioOutput`, `TempoDetector`
//! - **Error Handling**: Unified `ChordError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chord_core::types::{Track, UserId};
//!
//! let owner = UserId::generate();
//! let track = Track::new(owner, "Midnight Set", "A. Composer", "assets/midnight.flac");
//! assert!(track.gain_db.is_none()); // analysed at upload time, not here
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ChordError, Result};
pub use traits::{AudioDecoder, AudioOutput, TempoDetector};

pub use types::{
    // Audio types
    AudioBuffer, AudioFormat, SampleRate,
    // Identity
    SessionId, TrackId, UserId,
    // Domain
    LoopMode, PlayEvent, PlaybackSession, Report, Track, TrackReportRow,
};
