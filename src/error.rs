//! Error types for grille

use thiserror::Error;

/// Everything the core can reject.
///
/// Validation errors are raised as soon as a value is constructed and are
/// never retried or clamped; the caller decides what to do with them.
#[derive(Debug, Error)]
pub enum GrilleError {
    #[error("invalid {kind} '{text}'")]
    InvalidName { kind: &'static str, text: String },

    #[error("alteration {0} outside [-3, 3]")]
    AlterationOutOfRange(i32),

    #[error("octave {0} outside [0, 10]")]
    OctaveOutOfRange(i32),

    #[error("inversion {inversion} outside [0, {max}]")]
    InversionOutOfRange { inversion: usize, max: usize },

    #[error("invalid time signature {beats}/{unit}")]
    InvalidTimeSignature { beats: u32, unit: u32 },

    #[error("invalid tempo {0} bpm")]
    InvalidTempo(f64),

    #[error("zero denominator in '{0}'")]
    ZeroDenominator(String),

    #[error("step duration must be positive, got {0}")]
    InvalidStep(String),

    #[error("a scale is required to resolve degree {0}")]
    MissingScale(String),

    #[error("scale {name} has {notes} notes, diatonic chords need 7")]
    NotDiatonic { name: String, notes: usize },

    #[error("unknown {kind} quality '{name}'")]
    UnknownQuality { kind: &'static str, name: String },

    #[error("no interval spans {diatonic} diatonic steps")]
    UnknownInterval { diatonic: i32 },

    #[error("degree index {index} outside scale of {len} notes")]
    UnknownDegree { index: usize, len: usize },

    #[error("cannot compare {0} (with octave) against {1} (without)")]
    OctaveMismatch(String, String),

    #[error("pitch {0} has no MIDI number")]
    MidiRange(String),

    #[error("position {0} lies before the start of the piece")]
    NegativePosition(String),

    #[error("progression position ({harmony}, {chord}) does not exist")]
    ProgressionIndex { harmony: usize, chord: usize },

    #[error("grid has no chords")]
    EmptyGrid,

    #[error("player '{name}': {reason}")]
    Player { name: String, reason: String },

    #[error("output sink closed")]
    SinkClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl GrilleError {
    pub(crate) fn invalid(kind: &'static str, text: impl Into<String>) -> Self {
        GrilleError::InvalidName {
            kind,
            text: text.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrilleError>;
