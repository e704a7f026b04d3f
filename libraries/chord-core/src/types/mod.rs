//! Domain types for Chord

mod audio;
mod ids;
mod play_event;
mod session;
mod track;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use ids::{SessionId, TrackId, UserId};
pub use play_event::{PlayEvent, Report, TrackReportRow};
pub use session::{LoopMode, PlaybackSession};
pub use track::Track;
