//! Session volume control
//!
//! Volume is a unit-range multiplier with a separate mute flag. Muting
//! preserves the level so unmute restores the previous setting.

/// Volume controller
#[derive(Debug, Clone, Copy)]
pub struct Volume {
    /// Volume level in [0.0, 1.0]
    level: f32,

    /// Mute state (preserves the level)
    muted: bool,
}

impl Volume {
    /// Create a new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to [0.0, 1.0]
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Set the volume level (clamped to [0.0, 1.0]; non-finite input is
    /// treated as 0)
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    /// Get the current volume level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Set the mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain multiplier for audio processing (0.0 when muted)
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    /// Apply the volume to an audio buffer in-place
    pub fn apply(&self, buffer: &mut [f32]) {
        let gain = self.gain();

        if gain == 0.0 {
            buffer.fill(0.0);
        } else if gain != 1.0 {
            for sample in buffer.iter_mut() {
                *sample *= gain;
            }
        }
        // Unity gain needs no processing
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_clamped() {
        let mut vol = Volume::new(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.8);
        vol.set_muted(true);
        assert_eq!(vol.gain(), 0.0);
        assert_eq!(vol.level(), 0.8);

        vol.set_muted(false);
        assert!((vol.gain() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn apply_scales_buffer() {
        let vol = Volume::new(0.5);
        let mut buffer = vec![1.0, -0.5, 0.25];
        vol.apply(&mut buffer);
        assert!((buffer[0] - 0.5).abs() < 0.001);
        assert!((buffer[1] + 0.25).abs() < 0.001);
    }

    #[test]
    fn apply_muted_silences_buffer() {
        let mut vol = Volume::new(0.8);
        vol.set_muted(true);

        let mut buffer = vec![0.5, 0.8, -0.3];
        vol.apply(&mut buffer);
        assert_eq!(buffer, vec![0.0, 0.0, 0.0]);
    }
}
