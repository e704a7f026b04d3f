/// Core traits for Chord
use crate::error::Result;
use crate::types::AudioBuffer;

/// Audio decoder trait
///
/// Implementers decode a complete in-memory audio payload (any supported
/// codec) into interleaved stereo f32 PCM.
pub trait AudioDecoder: Send {
    /// Decode a full audio payload into an `AudioBuffer`
    ///
    /// # Errors
    /// Returns an error if the payload cannot be probed or decoded
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<AudioBuffer>;
}

/// Audio output trait
///
/// The host's real-time audio path. The playback engine drives it from a
/// single logical caller thread; implementations bridge to the platform
/// device (or a test double).
pub trait AudioOutput: Send {
    /// Construct the host processing path
    ///
    /// Called once per engine lifetime when the playback graph is built.
    ///
    /// # Errors
    /// Returns an error if the host path cannot be constructed; the engine
    /// degrades to direct playback in that case
    fn open(&mut self) -> Result<()>;

    /// Resume a suspended processing context
    ///
    /// # Errors
    /// Returns an error if the host refuses to start producing sound
    /// (e.g. an autoplay policy); the caller must roll back to not-playing
    fn resume(&mut self) -> Result<()>;

    /// Suspend the processing context
    ///
    /// # Errors
    /// Returns an error if the host rejects the suspension
    fn suspend(&mut self) -> Result<()>;

    /// Write processed samples (interleaved stereo f32) to the device
    ///
    /// # Errors
    /// Returns an error if the device rejects the buffer
    fn write(&mut self, samples: &[f32]) -> Result<()>;
}

/// Tempo detector trait
///
/// External collaborator: estimates the tempo of an audio payload. The
/// result is track metadata only and never feeds crediting logic.
pub trait TempoDetector: Send {
    /// Detect the tempo of the payload in BPM
    ///
    /// Returns `0.0` when no tempo could be detected.
    fn detect(&self, audio_bytes: &[u8]) -> f64;
}
