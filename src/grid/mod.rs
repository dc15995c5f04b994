//! The chord grid: what plays, in which order, for how long.

pub mod fields;
pub mod harmony;
pub mod progression;
pub mod timeline;

pub use fields::{ChordEntry, ChordFields, GridBuilder, HarmonyFields, ProgressionField};
pub use harmony::{ChordItem, Grid, HarmonyItem};
pub use progression::{Position, Progression};
pub use timeline::Segment;
