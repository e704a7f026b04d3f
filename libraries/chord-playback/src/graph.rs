//! The audio-processing graph: source → gain → output
//!
//! Construction opens the host processing path once per engine lifetime.
//! When construction fails the engine keeps playing without the graph;
//! unnormalized direct playback is the documented fallback, not a fault.

use crate::error::{PlaybackError, Result};
use chord_core::AudioOutput;
use chord_loudness::{clamp_gain, db_to_linear};

/// Duration of the gain ramp applied on track load
///
/// The target gain ramps in rather than jumping so track switches do not
/// click.
pub const GAIN_RAMP_MS: u32 = 50;

/// Per-track normalization gain with click-free ramping
///
/// Holds a linear gain that moves toward its target over [`GAIN_RAMP_MS`]
/// worth of frames. Applied per stereo frame before session volume.
#[derive(Debug, Clone)]
pub struct GainStage {
    /// Current linear gain
    current: f32,

    /// Target linear gain
    target: f32,

    /// Per-frame increment while ramping
    step: f32,

    /// Frames left in the active ramp
    ramp_frames_remaining: usize,

    /// Sample rate for ramp length calculation
    sample_rate: u32,
}

impl GainStage {
    /// Create a gain stage already settled at `initial_db`
    pub fn new(sample_rate: u32, initial_db: f64) -> Self {
        let linear = db_to_linear(clamp_gain(initial_db)) as f32;
        Self {
            current: linear,
            target: linear,
            step: 0.0,
            ramp_frames_remaining: 0,
            sample_rate,
        }
    }

    /// Schedule a smooth ramp to a new gain target
    ///
    /// The value is clamped to the supported gain range first.
    pub fn ramp_to_db(&mut self, gain_db: f64) {
        self.target = db_to_linear(clamp_gain(gain_db)) as f32;

        let frames = (u64::from(self.sample_rate) * u64::from(GAIN_RAMP_MS) / 1000) as usize;
        if frames == 0 || (self.target - self.current).abs() < f32::EPSILON {
            self.current = self.target;
            self.ramp_frames_remaining = 0;
            return;
        }

        self.step = (self.target - self.current) / frames as f32;
        self.ramp_frames_remaining = frames;
    }

    /// Whether a ramp is still in progress
    pub fn is_ramping(&self) -> bool {
        self.ramp_frames_remaining > 0
    }

    /// The settled (target) gain as a linear multiplier
    pub fn target_linear(&self) -> f32 {
        self.target
    }

    /// Apply the gain to an interleaved stereo buffer in-place
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            if self.ramp_frames_remaining > 0 {
                self.current += self.step;
                self.ramp_frames_remaining -= 1;
                if self.ramp_frames_remaining == 0 {
                    self.current = self.target;
                }
            }
            frame[0] *= self.current;
            frame[1] *= self.current;
        }
    }
}

/// The constructed processing graph
///
/// Owns the normalization gain stage. The output device itself stays with
/// the engine; constructing the graph opens the device path exactly once.
#[derive(Debug)]
pub struct AudioGraph {
    gain: GainStage,
}

impl AudioGraph {
    /// Construct the graph, opening the host processing path
    ///
    /// # Errors
    /// Returns an error when the host path cannot be constructed; the
    /// caller degrades to direct playback
    pub fn construct(
        output: &mut dyn AudioOutput,
        sample_rate: u32,
        initial_gain_db: f64,
    ) -> Result<Self> {
        output
            .open()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;

        Ok(Self {
            gain: GainStage::new(sample_rate, initial_gain_db),
        })
    }

    /// The normalization gain stage
    pub fn gain_mut(&mut self) -> &mut GainStage {
        &mut self.gain
    }

    /// Run the graph's processing over a stereo buffer
    pub fn process(&mut self, buffer: &mut [f32]) {
        self.gain.process(buffer);
    }
}
