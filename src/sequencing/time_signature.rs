use std::fmt;
use std::str::FromStr;

use super::duration::Duration;
use crate::error::{GrilleError, Result};

/// Time signature: how many beats make a bar, and which note value is the beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    /// Number of beats per bar (numerator)
    beats_per_bar: u32,
    /// Note value that gets one beat (denominator: 4 = quarter, 8 = eighth)
    beat_unit: u32,
}

impl TimeSignature {
    /// Standard 4/4 time
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        beats_per_bar: 4,
        beat_unit: 4,
    };

    /// 3/4 time (waltz)
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        beats_per_bar: 3,
        beat_unit: 4,
    };

    /// 2/4 time
    pub const TWO_FOUR: TimeSignature = TimeSignature {
        beats_per_bar: 2,
        beat_unit: 4,
    };

    /// 6/8 time
    pub const SIX_EIGHT: TimeSignature = TimeSignature {
        beats_per_bar: 6,
        beat_unit: 8,
    };

    /// 2/2 time (cut time)
    pub const TWO_TWO: TimeSignature = TimeSignature {
        beats_per_bar: 2,
        beat_unit: 2,
    };

    /// Create a time signature.
    /// `beat_unit` must be a power of two between 1 and 32.
    pub fn new(beats_per_bar: u32, beat_unit: u32) -> Result<Self> {
        if beats_per_bar == 0 || beat_unit == 0 || beat_unit > 32 || !beat_unit.is_power_of_two() {
            return Err(GrilleError::InvalidTimeSignature {
                beats: beats_per_bar,
                unit: beat_unit,
            });
        }
        Ok(Self {
            beats_per_bar,
            beat_unit,
        })
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn beat_unit(&self) -> u32 {
        self.beat_unit
    }

    /// Length of one beat: 4/beat_unit quarters.
    pub fn beat_duration(&self) -> Duration {
        Duration::from_ratio(num_rational::Rational64::new(4, i64::from(self.beat_unit)))
    }

    /// Length of one bar: beats_per_bar * 4/beat_unit quarters.
    pub fn bar_duration(&self) -> Duration {
        self.beat_duration() * i64::from(self.beats_per_bar)
    }

    /// Get the total duration of one bar in ticks
    pub fn bar_ticks(&self, ppq: u32) -> i64 {
        self.bar_duration().to_ticks(ppq)
    }

    /// Span from `offset` up to the next barline. A position sitting on a
    /// barline yields a full bar.
    pub fn fill_to_bar(&self, offset: Duration) -> Duration {
        let bar = self.bar_duration();
        bar - (offset % bar)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::FOUR_FOUR
    }
}

impl FromStr for TimeSignature {
    type Err = GrilleError;

    fn from_str(s: &str) -> Result<Self> {
        let (beats, unit) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| GrilleError::invalid("time signature", s))?;
        let beats: u32 = beats
            .trim()
            .parse()
            .map_err(|_| GrilleError::invalid("time signature", s))?;
        let unit: u32 = unit
            .trim()
            .parse()
            .map_err(|_| GrilleError::invalid("time signature", s))?;
        TimeSignature::new(beats, unit)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}
