pub mod duration;
pub mod pattern;
pub mod steps;
pub mod tempo;
pub mod time_section;
pub mod time_signature;

pub use duration::Duration;
pub use pattern::{Hit, HitSlot, Pattern, PatternSlot};
pub use steps::{Step, TimeSteps};
pub use tempo::Tempo;
pub use time_section::TimeSection;
pub use time_signature::TimeSignature;
