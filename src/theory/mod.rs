//! Diatonic and chromatic pitch arithmetic.
//!
//! Notes, intervals and degrees are small `Copy` values; scales and chords
//! are built from them by stacking intervals. Everything here is a pure
//! function of its inputs.

pub mod chord;
pub mod degree;
pub mod interval;
pub mod note;
pub mod quality;
pub mod scale;

pub use chord::{Chord, ChordBuilder};
pub use degree::Degree;
pub use interval::Interval;
pub use note::Note;
pub use quality::{ChordQuality, ScaleQuality};
pub use scale::Scale;
