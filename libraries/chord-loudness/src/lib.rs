//! Loudness estimation and playback-gain analysis for Chord
//!
//! This crate derives a per-track playback gain from an uploaded audio
//! payload:
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Audio Bytes │ ──► │ GainAnalyzer │ ──► │   TrackGain   │
//! └─────────────┘     └──────────────┘     └───────────────┘
//!
//! During Playback:
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Audio Data  │ ──► │  Gain Apply  │ ──► │    Output     │
//! └─────────────┘     └──────────────┘     └───────────────┘
//! ```
//!
//! The loudness estimate is a strided RMS over the decoded PCM, a simple
//! proxy, explicitly **not** a broadcast-standard perceptual measurement.
//! The stored asset is never altered; the gain is applied at listen time.
//!
//! # Example
//!
//! ```ignore
//! use chord_loudness::GainAnalyzer;
//!
//! let analyzer = GainAnalyzer::new();
//! let gain_db = analyzer.analyze(&uploaded_bytes);
//! assert!((chord_loudness::MIN_GAIN_DB..=chord_loudness::MAX_GAIN_DB).contains(&gain_db));
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod gain;

pub use analyzer::GainAnalyzer;
pub use gain::{clamp_gain, db_to_linear, TrackGain};

/// Target loudness for normalized playback (-14 dBFS RMS)
///
/// Matches the level common streaming platforms normalize toward. A tuning
/// constant, not a compliance claim.
pub const STREAMING_TARGET_DB: f64 = -14.0;

/// Maximum playback gain in dB
pub const MAX_GAIN_DB: f64 = 12.0;

/// Minimum playback gain in dB
pub const MIN_GAIN_DB: f64 = -12.0;

/// Gain returned when a payload cannot be decoded
pub const FALLBACK_GAIN_DB: f64 = 0.0;

/// Fixed sampling stride for the RMS estimate (every 4th sample)
pub const RMS_SAMPLE_STRIDE: usize = 4;

/// Floor applied before the dBFS conversion so silence stays finite
pub const RMS_FLOOR: f64 = 1e-9;
