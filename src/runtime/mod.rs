//! Real-time playback of a scheduled progression.

pub mod playback;

pub use playback::{Clock, ManualClock, Playback, PlaybackReport, StopHandle, SystemClock};
