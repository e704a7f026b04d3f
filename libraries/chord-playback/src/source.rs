//! Platform-agnostic audio source and the engine's temporary binding
//!
//! The engine never touches files or network handles directly: a
//! `SourceResolver` turns an asset locator into an `AudioSource`, and the
//! engine wraps it in a `SourceBinding`, the one temporary handle it is
//! allowed to hold. Dropping the binding releases whatever the resolver
//! acquired.

use crate::error::Result;
use std::time::Duration;

/// Platform-agnostic audio source
///
/// Implementors provide decoded audio samples and seeking. Samples are
/// interleaved stereo f32 in [-1.0, 1.0].
pub trait AudioSource: Send {
    /// Read the next chunk of samples
    ///
    /// Returns the number of samples written (0 = end of track).
    ///
    /// # Errors
    /// Returns an error on a decoding failure
    fn read_samples(&mut self, buffer: &mut [f32]) -> Result<usize>;

    /// Seek to a position from the start of the track
    ///
    /// # Errors
    /// Returns an error if the source cannot seek there
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Total track duration, when the source knows it
    fn duration(&self) -> Option<Duration>;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Whether the source has no more samples
    fn is_finished(&self) -> bool;

    /// Reset to the beginning of the track
    ///
    /// # Errors
    /// Returns an error if the source cannot seek
    fn reset(&mut self) -> Result<()> {
        self.seek(Duration::ZERO)
    }
}

/// Resolves an asset locator into a playable source
///
/// Acquiring a source may allocate a temporary resource (a handle, a decode
/// buffer, an object URL equivalent); releasing happens when the returned
/// source is dropped. The engine guarantees the previous source is dropped
/// before `resolve` is called for the next one.
pub trait SourceResolver: Send {
    /// Resolve `asset` into an audio source
    ///
    /// # Errors
    /// Returns an error if the locator cannot be resolved
    fn resolve(&mut self, asset: &str) -> Result<Box<dyn AudioSource>>;
}

/// The engine's one temporary handle: an asset locator bound to its source
///
/// Exactly one binding exists per loaded track; track switches are an
/// exclusive hand-off (old binding dropped, then the new one acquired).
pub struct SourceBinding {
    asset: String,
    source: Box<dyn AudioSource>,
}

impl SourceBinding {
    /// Bind a resolved source to its locator
    pub fn new(asset: impl Into<String>, source: Box<dyn AudioSource>) -> Self {
        Self {
            asset: asset.into(),
            source,
        }
    }

    /// The locator this binding was resolved from
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Borrow the underlying source
    pub fn source(&self) -> &dyn AudioSource {
        self.source.as_ref()
    }

    /// Mutably borrow the underlying source
    pub fn source_mut(&mut self) -> &mut dyn AudioSource {
        self.source.as_mut()
    }

    /// Duration of the bound track in seconds, when known
    pub fn duration_seconds(&self) -> Option<f64> {
        self.source.duration().map(|d| d.as_secs_f64())
    }

    /// Position of the bound track in seconds
    pub fn position_seconds(&self) -> f64 {
        self.source.position().as_secs_f64()
    }
}

impl std::fmt::Debug for SourceBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBinding")
            .field("asset", &self.asset)
            .finish_non_exhaustive()
    }
}
