use std::fmt;
use std::str::FromStr;

use super::duration::Duration;
use crate::error::{GrilleError, Result};

/// Tempo in quarter-note beats per minute.
///
/// This is the one place musical time turns into floating point: a
/// [`Duration`] stays exact until it is converted to wall-clock seconds here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tempo(f64);

impl Tempo {
    pub const DEFAULT: Tempo = Tempo(120.0);

    pub fn new(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(GrilleError::InvalidTempo(bpm));
        }
        Ok(Tempo(bpm))
    }

    pub fn bpm(self) -> f64 {
        self.0
    }

    /// Wall-clock length of a span: `quarters * 60 / bpm`.
    pub fn seconds(self, duration: Duration) -> f64 {
        duration.as_f64() * 60.0 / self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo::DEFAULT
    }
}

impl FromStr for Tempo {
    type Err = GrilleError;

    fn from_str(s: &str) -> Result<Self> {
        let bpm: f64 = s
            .trim()
            .parse()
            .map_err(|_| GrilleError::invalid("tempo", s))?;
        Tempo::new(bpm)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.0)
    }
}
