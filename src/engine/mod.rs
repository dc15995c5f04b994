//! Players and the scheduler that merges their streams.

pub mod player;
pub mod scheduler;
pub mod track;

pub use player::{Callback, Event, Meta, NoteEvent, Player, PlayerContext, ScriptedPlayer};
pub use scheduler::{Scheduled, Scheduler, Source};
pub use track::Track;
