//! Chord - Audio Decoding
//!
//! Symphonia-based decoding of complete in-memory audio payloads into
//! interleaved stereo f32 PCM.
//!
//! Uploaded assets arrive as raw bytes (any supported codec); this crate
//! probes the container, decodes every packet, and downmixes multichannel
//! audio to stereo. Gain analysis consumes the result offline; nothing here
//! touches the real-time playback path.

#![deny(unsafe_code)]

mod decoder;
mod error;

pub use decoder::{decode_bytes, SymphoniaDecoder};
pub use error::{AudioError, Result};
