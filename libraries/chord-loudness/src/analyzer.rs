//! Playback-gain analysis
//!
//! Estimates the loudness of a decoded payload with a strided RMS and
//! derives the gain needed to reach the target level. Runs offline at
//! upload time; the playback engine receives the result as a dB hint.

use crate::gain::{clamp_gain, TrackGain};
use crate::{FALLBACK_GAIN_DB, RMS_FLOOR, RMS_SAMPLE_STRIDE, STREAMING_TARGET_DB};
use chord_core::AudioBuffer;
use tracing::warn;

/// Offline gain analyzer
///
/// Pure with respect to global state: `analyze` borrows `&self`, so
/// independent payloads may be analyzed concurrently. All arithmetic is
/// double precision; rounding is left to presentation.
///
/// # Example
///
/// ```ignore
/// use chord_loudness::GainAnalyzer;
///
/// let analyzer = GainAnalyzer::new();
/// let gain_db = analyzer.analyze(&payload);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GainAnalyzer {
    /// Target loudness in dBFS
    target_db: f64,
}

impl GainAnalyzer {
    /// Create an analyzer with the default streaming target (-14 dB)
    pub fn new() -> Self {
        Self {
            target_db: STREAMING_TARGET_DB,
        }
    }

    /// Create an analyzer with a custom target loudness
    ///
    /// # Arguments
    /// * `target_db` - Target loudness in dBFS
    pub fn with_target(target_db: f64) -> Self {
        Self { target_db }
    }

    /// Analyze a raw audio payload and return the playback gain in dB
    ///
    /// Decode failures are logged and fall back to 0.0 dB; an upload never
    /// hard-fails because its loudness could not be measured. The result is
    /// always finite and within the supported gain range.
    pub fn analyze(&self, audio_bytes: &[u8]) -> f64 {
        match chord_audio::decode_bytes(audio_bytes) {
            Ok(buffer) => self.analyze_buffer(&buffer).gain_db,
            Err(e) => {
                warn!("gain analysis could not decode payload, using 0 dB: {}", e);
                FALLBACK_GAIN_DB
            }
        }
    }

    /// Analyze decoded PCM and return the full gain result
    pub fn analyze_buffer(&self, buffer: &AudioBuffer) -> TrackGain {
        let rms = strided_rms(&buffer.samples);
        let rms_dbfs = 20.0 * rms.max(RMS_FLOOR).log10();
        let gain_db = clamp_gain(self.target_db - rms_dbfs);

        TrackGain {
            gain_db,
            rms_dbfs,
            target_db: self.target_db,
        }
    }

    /// The target loudness this analyzer normalizes toward
    pub fn target_db(&self) -> f64 {
        self.target_db
    }
}

impl Default for GainAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS over every [`RMS_SAMPLE_STRIDE`]th sample across all channels
///
/// `rms = sqrt(sum_of_squares / sample_count)` where `sample_count` is the
/// number of samples actually visited. Accumulates in f64.
fn strided_rms(samples: &[f32]) -> f64 {
    let mut sum_of_squares = 0.0_f64;
    let mut count = 0_u64;

    let mut i = 0;
    while i < samples.len() {
        let sample = f64::from(samples[i]);
        sum_of_squares += sample * sample;
        count += 1;
        i += RMS_SAMPLE_STRIDE;
    }

    if count == 0 {
        0.0
    } else {
        (sum_of_squares / count as f64).sqrt()
    }
}
