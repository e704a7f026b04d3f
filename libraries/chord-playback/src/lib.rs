//! Chord - Playback Engine
//!
//! Resource-managed playback with per-track loudness normalization.
//!
//! This crate provides:
//! - An explicitly owned playback engine (no global state); the
//!   composition root creates one and passes it by handle
//! - Exclusive source binding: at most one bound source and one temporary
//!   handle at a time, released before the next is acquired
//! - A source → gain → output processing graph with smooth gain ramping,
//!   degrading to direct playback when the graph cannot be built
//! - Transport controls (play/pause/seek/volume/mute) with blocked-play
//!   rollback
//! - A single-subscriber event observer (position updates and a terminal
//!   ended signal per track)
//!
//! Platform specifics (decoding, the device path) are provided via traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use chord_playback::{PlaybackEngine, SourceResolver};
//! use chord_core::{AudioOutput, TrackId};
//!
//! # fn resolver() -> Box<dyn SourceResolver> { unimplemented!() }
//! # fn output() -> Box<dyn AudioOutput> { unimplemented!() }
//! let mut engine = PlaybackEngine::new(resolver(), output());
//!
//! engine.load(TrackId::new("track-1"), "assets/track-1.flac", -3.5)?;
//! engine.play()?;
//! engine.tick(0.1)?; // host clock drives the engine
//! # Ok::<(), chord_playback::PlaybackError>(())
//! ```

#![deny(unsafe_code)]

mod engine;
mod error;
pub mod events;
mod graph;
mod source;
mod volume;

pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::{EngineEvent, EngineObserver, EngineState};
pub use graph::{AudioGraph, GainStage, GAIN_RAMP_MS};
pub use source::{AudioSource, SourceBinding, SourceResolver};
pub use volume::Volume;
