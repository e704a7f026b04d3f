//! Play-event recording
//!
//! Subscribes to the playback engine and turns each occupancy of the
//! current-track slot into at most one immutable play event. Listened time
//! accrues from a wall clock only while the engine reports playing; paused
//! intervals never count.
//!
//! Flushing happens on the engine's terminal ended signal. A manual track
//! change mid-listen abandons the occupancy without an event, a recorded
//! design decision, not an oversight (see DESIGN.md).

use crate::error::Result;
use crate::{MIN_COUNTED_PERCENT, MIN_COUNTED_SECONDS};
use chord_core::{PlayEvent, SessionId, TrackId, UserId};
use chord_playback::{EngineEvent, EngineObserver, EngineState};
use chrono::Utc;
use std::time::Instant;
use tracing::warn;

/// Whether a listen meets the royalty crediting threshold
///
/// Pure function of the listened seconds and percentage.
pub fn is_counted(seconds_listened: f64, percent_listened: f64) -> bool {
    seconds_listened >= MIN_COUNTED_SECONDS || percent_listened >= MIN_COUNTED_PERCENT
}

/// Listened share of the track, in percent
///
/// 0.0 when the duration is unknown or zero. Deliberately not capped at
/// 100: looping past the end keeps accruing.
pub fn percent_listened(seconds_listened: f64, duration_seconds: Option<f64>) -> f64 {
    match duration_seconds {
        Some(duration) if duration > 0.0 => seconds_listened / duration * 100.0,
        _ => 0.0,
    }
}

/// Monotonic time source for the listened-time accumulator
///
/// A seam so tests can drive time deterministically; production uses
/// [`MonotonicClock`].
pub trait Clock: Send {
    /// Seconds elapsed on this clock's monotonic timeline
    fn now_seconds(&self) -> f64;
}

/// Wall clock backed by `std::time::Instant`
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Destination for finished play events
///
/// Synchronous on the recorder's thread; a failure is logged and the event
/// is dropped; client state never leaks across tracks because of a
/// persistence problem.
pub trait PlayEventSink: Send {
    /// Persist one play event
    ///
    /// # Errors
    /// Returns an error if the event could not be stored
    fn persist(&mut self, event: &PlayEvent) -> Result<()>;
}

/// Sink that buffers events for a composition root to drain
///
/// Lets the synchronous recorder hand events to an async storage layer
/// without blocking the engine's caller thread.
#[derive(Debug, Default)]
pub struct BufferedEventSink {
    pending: Vec<PlayEvent>,
}

impl BufferedEventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered event
    pub fn drain(&mut self) -> Vec<PlayEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the sink is empty
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl PlayEventSink for BufferedEventSink {
    fn persist(&mut self, event: &PlayEvent) -> Result<()> {
        self.pending.push(event.clone());
        Ok(())
    }
}

/// One occupancy of the engine's current-track slot
#[derive(Debug)]
struct Occupancy {
    track_id: TrackId,
    duration_seconds: Option<f64>,
    accumulated_seconds: f64,
    playing_since: Option<f64>,
}

impl Occupancy {
    fn new(track_id: TrackId, duration_seconds: Option<f64>) -> Self {
        Self {
            track_id,
            duration_seconds,
            accumulated_seconds: 0.0,
            playing_since: None,
        }
    }
}

/// Records one play event per continuous occupancy of the current track
pub struct PlayEventRecorder {
    user_id: UserId,
    session_id: SessionId,
    sink: Box<dyn PlayEventSink>,
    clock: Box<dyn Clock>,
    occupancy: Option<Occupancy>,
}

impl PlayEventRecorder {
    /// Create a recorder for one listening session
    pub fn new(user_id: UserId, sink: Box<dyn PlayEventSink>) -> Self {
        Self::with_clock(user_id, sink, Box::new(MonotonicClock::new()))
    }

    /// Create a recorder with an explicit clock (tests drive time manually)
    pub fn with_clock(user_id: UserId, sink: Box<dyn PlayEventSink>, clock: Box<dyn Clock>) -> Self {
        Self {
            user_id,
            session_id: SessionId::generate(),
            sink,
            clock,
            occupancy: None,
        }
    }

    /// The opaque session this recorder stamps onto its events
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Seconds accumulated for the current occupancy so far
    pub fn accumulated_seconds(&self) -> f64 {
        match self.occupancy.as_ref() {
            Some(occupancy) => {
                let live = occupancy
                    .playing_since
                    .map_or(0.0, |since| (self.clock.now_seconds() - since).max(0.0));
                occupancy.accumulated_seconds + live
            }
            None => 0.0,
        }
    }

    /// Fold any live playing interval into the accumulator
    fn settle(&mut self) {
        let now = self.clock.now_seconds();
        if let Some(occupancy) = self.occupancy.as_mut() {
            if let Some(since) = occupancy.playing_since.take() {
                occupancy.accumulated_seconds += (now - since).max(0.0);
            }
        }
    }

    /// Emit the play event for the ending occupancy
    ///
    /// The accumulator reset is the `take()`: it happens before the sink
    /// runs and is therefore unconditional even when persistence fails.
    fn flush(&mut self) {
        self.settle();

        let Some(occupancy) = self.occupancy.take() else {
            return;
        };

        let seconds_listened = occupancy.accumulated_seconds;
        let percent = percent_listened(seconds_listened, occupancy.duration_seconds);

        let event = PlayEvent {
            id: None,
            track_id: occupancy.track_id,
            user_id: self.user_id.clone(),
            timestamp: Utc::now(),
            seconds_listened,
            percent_listened: percent,
            session_id: self.session_id.clone(),
            counted: is_counted(seconds_listened, percent),
        };

        if let Err(e) = self.sink.persist(&event) {
            // Accepted lossy tradeoff: the event is gone, the state is clean
            warn!("play event dropped: {}", e);
        }
    }
}

impl EngineObserver for PlayEventRecorder {
    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::TrackLoaded {
                track_id,
                duration_seconds,
            } => {
                // New occupancy: any abandoned one is discarded unflushed
                self.occupancy = Some(Occupancy::new(track_id.clone(), *duration_seconds));
            }
            EngineEvent::StateChanged { state } => match state {
                EngineState::Playing => {
                    let now = self.clock.now_seconds();
                    if let Some(occupancy) = self.occupancy.as_mut() {
                        if occupancy.playing_since.is_none() {
                            occupancy.playing_since = Some(now);
                        }
                    }
                }
                EngineState::Paused
                | EngineState::Loaded
                | EngineState::Idle
                | EngineState::Ended => self.settle(),
            },
            EngineEvent::TrackEnded { .. } => self.flush(),
            EngineEvent::PositionUpdate { .. } | EngineEvent::VolumeChanged { .. } => {}
        }
    }
}

impl std::fmt::Debug for PlayEventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayEventRecorder")
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("occupancy", &self.occupancy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoyaltyError;
    use std::sync::{Arc, Mutex};

    /// Clock advanced by hand
    #[derive(Clone)]
    struct FakeClock {
        seconds: Arc<Mutex<f64>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                seconds: Arc::new(Mutex::new(0.0)),
            }
        }

        fn advance(&self, dt: f64) {
            *self.seconds.lock().unwrap() += dt;
        }
    }

    impl Clock for FakeClock {
        fn now_seconds(&self) -> f64 {
            *self.seconds.lock().unwrap()
        }
    }

    /// Sink exposing its events through a shared handle
    #[derive(Clone, Default)]
    struct SharedSink {
        events: Arc<Mutex<Vec<PlayEvent>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl PlayEventSink for SharedSink {
        fn persist(&mut self, event: &PlayEvent) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(RoyaltyError::Persistence("disk full".to_string()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn recorder_with(
        clock: &FakeClock,
        sink: &SharedSink,
    ) -> PlayEventRecorder {
        PlayEventRecorder::with_clock(
            UserId::new("listener"),
            Box::new(sink.clone()),
            Box::new(clock.clone()),
        )
    }

    fn load(recorder: &mut PlayEventRecorder, track: &str, duration: Option<f64>) {
        recorder.on_event(&EngineEvent::TrackLoaded {
            track_id: TrackId::new(track),
            duration_seconds: duration,
        });
    }

    fn state(recorder: &mut PlayEventRecorder, state: EngineState) {
        recorder.on_event(&EngineEvent::StateChanged { state });
    }

    fn end(recorder: &mut PlayEventRecorder, track: &str) {
        recorder.on_event(&EngineEvent::TrackEnded {
            track_id: TrackId::new(track),
        });
    }

    // ===== Crediting exactness =====

    #[test]
    fn crediting_thresholds_are_exact() {
        // 100s track: just below both thresholds
        assert!(!is_counted(29.9, 29.9));
        assert!(!is_counted(29.9, 49.9));
        // Seconds threshold alone
        assert!(is_counted(30.0, 30.0));
        // 5s track looped to 10 listened seconds
        assert!(is_counted(10.0, 50.0));
        // Percent threshold alone
        assert!(is_counted(4.0, 50.0));
    }

    #[test]
    fn percent_is_zero_without_duration() {
        assert_eq!(percent_listened(25.0, None), 0.0);
        assert_eq!(percent_listened(25.0, Some(0.0)), 0.0);
        assert!((percent_listened(50.0, Some(100.0)) - 50.0).abs() < f64::EPSILON);
        // Not capped at 100
        assert!((percent_listened(10.0, Some(5.0)) - 200.0).abs() < f64::EPSILON);
    }

    // ===== Occupancy lifecycle =====

    #[test]
    fn paused_intervals_do_not_accrue() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", Some(100.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(20.0);
        state(&mut recorder, EngineState::Paused);
        clock.advance(300.0); // a long pause
        state(&mut recorder, EngineState::Playing);
        clock.advance(15.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!((events[0].seconds_listened - 35.0).abs() < 0.001);
        assert!((events[0].percent_listened - 35.0).abs() < 0.001);
        assert!(events[0].counted); // 35s >= 30s
    }

    #[test]
    fn short_listen_is_not_counted() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", Some(100.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(12.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].counted);
    }

    #[test]
    fn exactly_one_event_per_occupancy() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", Some(50.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(50.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1");
        // A duplicate terminal signal must not produce a second event
        end(&mut recorder, "t1");

        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn manual_track_switch_does_not_flush() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", Some(100.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(45.0); // would be counted, but the listener skips
        state(&mut recorder, EngineState::Loaded);
        load(&mut recorder, "t2", Some(80.0));

        assert!(sink.events.lock().unwrap().is_empty());

        // The new occupancy starts from zero
        state(&mut recorder, EngineState::Playing);
        clock.advance(10.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t2");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].track_id, TrackId::new("t2"));
        assert!((events[0].seconds_listened - 10.0).abs() < 0.001);
    }

    #[test]
    fn accumulator_resets_even_when_persistence_fails() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        *sink.fail.lock().unwrap() = true;
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", Some(100.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(60.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1"); // dropped, but state must be clean

        assert!(sink.events.lock().unwrap().is_empty());
        assert_eq!(recorder.accumulated_seconds(), 0.0);

        // Next track is unaffected by the failure
        *sink.fail.lock().unwrap() = false;
        load(&mut recorder, "t2", Some(100.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(31.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t2");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!((events[0].seconds_listened - 31.0).abs() < 0.001);
    }

    #[test]
    fn unknown_duration_counts_by_seconds_only() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);

        load(&mut recorder, "t1", None);
        state(&mut recorder, EngineState::Playing);
        clock.advance(31.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1");

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0].percent_listened, 0.0);
        assert!(events[0].counted);
    }

    #[test]
    fn events_carry_session_identity() {
        let clock = FakeClock::new();
        let sink = SharedSink::default();
        let mut recorder = recorder_with(&clock, &sink);
        let session = recorder.session_id().clone();

        load(&mut recorder, "t1", Some(10.0));
        state(&mut recorder, EngineState::Playing);
        clock.advance(10.0);
        state(&mut recorder, EngineState::Ended);
        end(&mut recorder, "t1");

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0].session_id, session);
        assert_eq!(events[0].user_id, UserId::new("listener"));
        assert!(events[0].id.is_none()); // storage assigns row IDs
    }

    #[test]
    fn buffered_sink_drains() {
        let mut sink = BufferedEventSink::new();
        assert!(sink.is_empty());

        let event = PlayEvent {
            id: None,
            track_id: TrackId::new("t"),
            user_id: UserId::new("u"),
            timestamp: Utc::now(),
            seconds_listened: 31.0,
            percent_listened: 10.0,
            session_id: SessionId::generate(),
            counted: true,
        };
        sink.persist(&event).unwrap();
        assert_eq!(sink.len(), 1);

        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
    }
}
