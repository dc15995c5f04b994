pub mod config;
pub mod engine; // Players and the stream merge
pub mod error;
pub mod grid; // Chord grids and the progression cursor
pub mod io;
pub mod players;
pub mod runtime;
pub mod sequencing; // Musical time and rhythm patterns
pub mod theory; // Notes, intervals, chords and scales

pub use config::Config;
pub use error::{GrilleError, Result};
