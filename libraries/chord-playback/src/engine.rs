//! Playback engine - core orchestration
//!
//! Owns the one bound source, the processing graph, and the session state.
//! Created explicitly at a composition root and passed by handle; the
//! single-active-track invariant is held by ownership, not globals. The
//! public surface is `&mut self` and is driven from one logical caller
//! thread.

use crate::{
    error::{PlaybackError, Result},
    events::{EngineEvent, EngineObserver, EngineState},
    graph::AudioGraph,
    source::{SourceBinding, SourceResolver},
    volume::Volume,
};
use chord_core::{AudioOutput, LoopMode, PlaybackSession, TrackId};
use chord_loudness::clamp_gain;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on frames consumed per tick (keeps the scratch buffer small)
const MAX_TICK_FRAMES: usize = 8192;

/// The playback engine
pub struct PlaybackEngine {
    // State
    state: EngineState,
    current_track: Option<TrackId>,

    // The one temporary handle (exclusive hand-off on track switch)
    binding: Option<SourceBinding>,
    resolver: Box<dyn SourceResolver>,

    // Processing graph; `None` + `graph_failed` = degraded direct playback
    graph: Option<AudioGraph>,
    graph_failed: bool,
    pending_gain_db: f64,
    output: Box<dyn AudioOutput>,

    // Session settings
    volume: Volume,
    loop_mode: LoopMode,
    shuffle: bool,
    sample_rate: u32,

    // Single subscriber (set replaces, never accumulates)
    observer: Option<Box<dyn EngineObserver>>,

    // Pre-allocated tick buffer (interleaved stereo)
    scratch: Vec<f32>,
}

impl PlaybackEngine {
    /// Create a new engine over a source resolver and an output device
    pub fn new(resolver: Box<dyn SourceResolver>, output: Box<dyn AudioOutput>) -> Self {
        Self {
            state: EngineState::Idle,
            current_track: None,
            binding: None,
            resolver,
            graph: None,
            graph_failed: false,
            pending_gain_db: 0.0,
            output,
            volume: Volume::default(),
            loop_mode: LoopMode::Off,
            shuffle: false,
            sample_rate: 44100,
            observer: None,
            scratch: vec![0.0; MAX_TICK_FRAMES * 2],
        }
    }

    // ===== Subscription =====

    /// Register the engine's subscriber, replacing any previous one
    pub fn set_observer(&mut self, observer: Box<dyn EngineObserver>) {
        self.observer = Some(observer);
    }

    /// Remove the current subscriber
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn emit(&mut self, event: EngineEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            self.state = state;
            self.emit(EngineEvent::StateChanged { state });
        }
    }

    // ===== Loading =====

    /// Bind a track's asset to the engine with its normalization gain hint
    ///
    /// Releases the previously held binding **before** acquiring the new
    /// one: no overlap, no leak across track switches. The gain ramps in
    /// over ~50ms instead of jumping. Observable state after load is
    /// position 0, not playing; loading the same asset twice is
    /// indistinguishable from loading it once.
    ///
    /// # Errors
    /// Returns an error when the locator cannot be resolved; the engine is
    /// left idle with no binding
    pub fn load(&mut self, track_id: TrackId, asset: &str, gain_db: f64) -> Result<()> {
        if self.state == EngineState::Playing {
            let _ = self.output.suspend();
        }

        // Exclusive hand-off: drop the old binding before resolving
        self.binding = None;

        let source = match self.resolver.resolve(asset) {
            Ok(source) => source,
            Err(e) => {
                self.current_track = None;
                self.set_state(EngineState::Idle);
                return Err(e);
            }
        };

        let binding = SourceBinding::new(asset, source);
        let duration_seconds = binding.duration_seconds();
        self.binding = Some(binding);
        self.current_track = Some(track_id.clone());

        let gain_db = clamp_gain(gain_db);
        self.pending_gain_db = gain_db;
        if let Some(graph) = self.graph.as_mut() {
            graph.gain_mut().ramp_to_db(gain_db);
        }

        self.set_state(EngineState::Loaded);
        self.emit(EngineEvent::TrackLoaded {
            track_id,
            duration_seconds,
        });
        self.emit(EngineEvent::PositionUpdate {
            position_seconds: 0.0,
            duration_seconds,
        });
        Ok(())
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// Constructs the processing graph once per engine lifetime; if that
    /// fails, playback continues unnormalized (documented fallback). When
    /// the host refuses audible playback the engine stays in its previous
    /// not-playing state and the call is retry-safe.
    ///
    /// # Errors
    /// `NoTrackLoaded` without a binding; `PlaybackBlocked` when the host
    /// refuses to resume
    pub fn play(&mut self) -> Result<()> {
        if self.binding.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.state == EngineState::Playing {
            return Ok(());
        }

        // Replaying after a natural end restarts from the top
        if self.state == EngineState::Ended {
            if let Some(binding) = self.binding.as_mut() {
                binding.source_mut().reset()?;
            }
        }

        self.ensure_graph();

        match self.output.resume() {
            Ok(()) => {
                self.set_state(EngineState::Playing);
                Ok(())
            }
            Err(e) => {
                // Roll back: state untouched, never "claims playing"
                debug!("host refused playback, staying paused: {}", e);
                Err(PlaybackError::PlaybackBlocked)
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == EngineState::Playing {
            let _ = self.output.suspend();
            self.set_state(EngineState::Paused);
        }
    }

    /// Stop playback, rewinding the current track
    pub fn stop(&mut self) {
        if self.state == EngineState::Playing {
            let _ = self.output.suspend();
        }
        if let Some(binding) = self.binding.as_mut() {
            if let Err(e) = binding.source_mut().reset() {
                warn!("failed to rewind source on stop: {}", e);
            }
            self.set_state(EngineState::Loaded);
        } else {
            self.set_state(EngineState::Idle);
        }
    }

    /// Seek to a position in seconds
    ///
    /// Non-finite input is ignored; negative positions clamp to 0 and
    /// positions past the end clamp to the duration.
    ///
    /// # Errors
    /// `NoTrackLoaded` without a binding; source errors propagate
    pub fn seek(&mut self, position_seconds: f64) -> Result<()> {
        if !position_seconds.is_finite() {
            debug!("ignoring non-finite seek target");
            return Ok(());
        }

        let binding = self.binding.as_mut().ok_or(PlaybackError::NoTrackLoaded)?;

        let mut target = position_seconds.max(0.0);
        if let Some(duration) = binding.duration_seconds() {
            target = target.min(duration);
        }
        binding.source_mut().seek(Duration::from_secs_f64(target))
    }

    /// Set the session volume (clamped to [0.0, 1.0])
    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set_level(volume);
        let event = EngineEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        };
        self.emit(event);
    }

    /// Set the mute state (preserves the volume level)
    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        let event = EngineEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        };
        self.emit(event);
    }

    /// Set the loop mode
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Set the shuffle flag
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    // ===== Clock =====

    /// Advance the engine by `dt_seconds` of host time
    ///
    /// While playing, pulls samples from the source, runs them through the
    /// graph (gain, then volume) into the output, and fires a position
    /// update. Emits exactly one `TrackEnded` when the source runs dry.
    ///
    /// # Errors
    /// Source read and device write errors propagate
    pub fn tick(&mut self, dt_seconds: f64) -> Result<()> {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return Ok(());
        }
        if self.state != EngineState::Playing {
            return Ok(());
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        let pumped = self.pump_frames(dt_seconds, &mut scratch);
        self.scratch = scratch;
        let reached_end = pumped?;

        let (position_seconds, duration_seconds) = self.position_duration();
        self.emit(EngineEvent::PositionUpdate {
            position_seconds,
            duration_seconds,
        });

        if reached_end {
            self.finish_track();
        }

        Ok(())
    }

    /// Pull `dt_seconds` worth of frames through the processing chain
    ///
    /// Works in bounded chunks so the scratch buffer stays small. Returns
    /// `true` when the source ran dry.
    fn pump_frames(&mut self, dt_seconds: f64, scratch: &mut Vec<f32>) -> Result<bool> {
        let mut remaining = (dt_seconds * f64::from(self.sample_rate)) as usize;

        while remaining > 0 {
            let chunk = remaining.min(MAX_TICK_FRAMES);
            let wanted = chunk * 2;
            if scratch.len() < wanted {
                scratch.resize(wanted, 0.0);
            }

            let binding = self.binding.as_mut().ok_or(PlaybackError::NoTrackLoaded)?;
            let samples_read = binding.source_mut().read_samples(&mut scratch[..wanted])?;
            let finished = binding.source().is_finished();

            if samples_read > 0 {
                self.process_audio(&mut scratch[..samples_read]);
                self.output
                    .write(&scratch[..samples_read])
                    .map_err(|e| PlaybackError::Output(e.to_string()))?;
            }

            if samples_read == 0 || finished {
                return Ok(true);
            }
            remaining -= chunk;
        }

        Ok(false)
    }

    /// Apply the processing chain to a stereo buffer in-place
    ///
    /// Gain stage first (when the graph exists), then session volume. In
    /// degraded mode only the volume applies.
    pub fn process_audio(&mut self, buffer: &mut [f32]) {
        if let Some(graph) = self.graph.as_mut() {
            graph.process(buffer);
        }
        self.volume.apply(buffer);
    }

    // ===== Introspection =====

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Currently bound track, if any
    pub fn current_track(&self) -> Option<&TrackId> {
        self.current_track.as_ref()
    }

    /// Playback position in seconds
    pub fn position_seconds(&self) -> f64 {
        self.binding
            .as_ref()
            .map_or(0.0, SourceBinding::position_seconds)
    }

    /// Track duration in seconds, when known
    pub fn duration_seconds(&self) -> Option<f64> {
        self.binding.as_ref().and_then(SourceBinding::duration_seconds)
    }

    /// Whether the engine fell back to unnormalized direct playback
    pub fn is_degraded(&self) -> bool {
        self.graph_failed
    }

    /// Whether a source binding is currently held
    pub fn has_binding(&self) -> bool {
        self.binding.is_some()
    }

    /// Snapshot of the ephemeral playback session
    pub fn session(&self) -> PlaybackSession {
        PlaybackSession {
            current_track: self.current_track.clone(),
            is_playing: self.state == EngineState::Playing,
            position_seconds: self.position_seconds(),
            duration_seconds: self.duration_seconds(),
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            loop_mode: self.loop_mode,
            shuffle: self.shuffle,
        }
    }

    /// Override the engine sample rate (defaults to 44.1kHz)
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
    }

    // ===== Internal =====

    /// Construct the processing graph once per engine lifetime
    ///
    /// On failure the engine keeps the device-free direct path and never
    /// retries; normalization is silently absent.
    fn ensure_graph(&mut self) {
        if self.graph.is_some() || self.graph_failed {
            return;
        }
        match AudioGraph::construct(self.output.as_mut(), self.sample_rate, self.pending_gain_db) {
            Ok(graph) => self.graph = Some(graph),
            Err(e) => {
                warn!("audio graph construction failed, using direct playback: {}", e);
                self.graph_failed = true;
            }
        }
    }

    fn position_duration(&self) -> (f64, Option<f64>) {
        match self.binding.as_ref() {
            Some(binding) => (binding.position_seconds(), binding.duration_seconds()),
            None => (0.0, None),
        }
    }

    /// Terminal transition for the current track
    ///
    /// Emits the single ended signal; the subscriber's flush completes
    /// synchronously before this returns, so the next load cannot begin a
    /// new accumulation session first.
    fn finish_track(&mut self) {
        let _ = self.output.suspend();
        self.set_state(EngineState::Ended);
        if let Some(track_id) = self.current_track.clone() {
            self.emit(EngineEvent::TrackEnded { track_id });
        }
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state)
            .field("current_track", &self.current_track)
            .field("degraded", &self.graph_failed)
            .finish_non_exhaustive()
    }
}
