//! Session defaults, loadable from TOML.
//!
//! ```toml
//! tempo = 96.0
//! time_signature = "3/4"
//! scale = "D_dorian"
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GrilleError, Result};
use crate::sequencing::{Tempo, TimeSignature};
use crate::theory::Scale;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tempo of the first harmony item when it names none
    pub tempo: f64,
    pub time_signature: String,
    pub scale: String,
    /// Default note velocity for players
    pub velocity: u8,
    /// Default MIDI channel (0-based)
    pub channel: u8,
    /// Octave that octave-less chords are voiced from
    pub octave: u8,
    /// Ticks per quarter note reported with emitted events
    pub ppq: u32,
    /// Slots in the output worker's ring buffer
    pub queue_capacity: usize,
    /// Start over after the last chord instead of stopping
    pub repeat: bool,
    /// Stay on the current chord instead of advancing
    pub chord_loop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tempo: Tempo::DEFAULT.bpm(),
            time_signature: TimeSignature::FOUR_FOUR.to_string(),
            scale: "C_major".to_string(),
            velocity: 100,
            channel: 0,
            octave: 4,
            ppq: 480,
            queue_capacity: 1024,
            repeat: false,
            chord_loop: false,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field that has a typed form.
    pub fn validate(&self) -> Result<()> {
        self.tempo()?;
        self.time_signature()?;
        self.scale()?;
        if self.velocity > 127 {
            return Err(GrilleError::MidiRange(format!("velocity {}", self.velocity)));
        }
        if self.channel > 15 {
            return Err(GrilleError::MidiRange(format!("channel {}", self.channel)));
        }
        if i32::from(self.octave) > crate::theory::note::MAX_OCTAVE {
            return Err(GrilleError::OctaveOutOfRange(i32::from(self.octave)));
        }
        if self.ppq == 0 {
            return Err(GrilleError::invalid("ppq", "0"));
        }
        if self.queue_capacity == 0 {
            return Err(GrilleError::invalid("queue capacity", "0"));
        }
        Ok(())
    }

    pub fn tempo(&self) -> Result<Tempo> {
        Tempo::new(self.tempo)
    }

    pub fn time_signature(&self) -> Result<TimeSignature> {
        self.time_signature.parse()
    }

    pub fn scale(&self) -> Result<Scale> {
        self.scale.parse()
    }
}
