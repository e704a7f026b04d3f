//! Property-based tests for gain analysis
//!
//! The clamp invariant must hold for arbitrary PCM content, not just the
//! hand-picked levels in the unit tests.

use chord_core::{AudioBuffer, AudioFormat, SampleRate};
use chord_loudness::{GainAnalyzer, MAX_GAIN_DB, MIN_GAIN_DB};
use proptest::prelude::*;

proptest! {
    #[test]
    fn gain_stays_in_range_for_arbitrary_pcm(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 0..4096)
    ) {
        let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, 32);
        let buffer = AudioBuffer::new(samples, format);

        let gain = GainAnalyzer::new().analyze_buffer(&buffer);

        prop_assert!(gain.gain_db.is_finite());
        prop_assert!((MIN_GAIN_DB..=MAX_GAIN_DB).contains(&gain.gain_db));
    }

    #[test]
    fn louder_content_never_gets_more_gain(level_a in 0.001f32..1.0, level_b in 0.001f32..1.0) {
        let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, 32);
        let quiet = level_a.min(level_b);
        let loud = level_a.max(level_b);

        let analyzer = GainAnalyzer::new();
        let gain_quiet = analyzer.analyze_buffer(&AudioBuffer::new(vec![quiet; 1024], format));
        let gain_loud = analyzer.analyze_buffer(&AudioBuffer::new(vec![loud; 1024], format));

        prop_assert!(gain_quiet.gain_db >= gain_loud.gain_db);
    }
}
