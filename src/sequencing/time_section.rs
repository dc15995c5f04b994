use std::fmt;

use num_rational::Rational64;
use num_traits::{One, Signed, Zero};

use super::duration::Duration;
use super::time_signature::TimeSignature;
use crate::error::{GrilleError, Result};

/// Bar/beat coordinate of a position under a time signature.
///
/// `bar` and `beat` count from zero; `remainder` is the fraction of a beat
/// already elapsed, always in `[0, 1)`. Conversion to and from an absolute
/// [`Duration`] is exact in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSection {
    bar: u32,
    beat: u32,
    remainder: Rational64,
}

impl TimeSection {
    pub const START: TimeSection = TimeSection {
        bar: 0,
        beat: 0,
        remainder: Rational64::new_raw(0, 1),
    };

    pub fn new(bar: u32, beat: u32, remainder: Rational64) -> Result<Self> {
        if remainder.is_negative() || remainder >= Rational64::one() {
            return Err(GrilleError::invalid("beat remainder", remainder.to_string()));
        }
        Ok(Self {
            bar,
            beat,
            remainder,
        })
    }

    /// Locate an absolute offset (from the start of the time-signature run).
    pub fn from_duration(ts: &TimeSignature, offset: Duration) -> Result<Self> {
        if offset.is_negative() {
            return Err(GrilleError::NegativePosition(offset.to_string()));
        }
        let bar_len = ts.bar_duration();
        let beat_len = ts.beat_duration();

        let bar = offset.div_floor(bar_len);
        let in_bar = offset % bar_len;
        let beat = in_bar.div_floor(beat_len);
        let remainder = (in_bar % beat_len).ratio_to(beat_len);

        let bar = u32::try_from(bar).map_err(|_| GrilleError::invalid("bar", bar.to_string()))?;
        // beat < beats_per_bar, which is a u32
        let beat = beat as u32;
        Ok(Self {
            bar,
            beat,
            remainder,
        })
    }

    /// Absolute offset of this coordinate. Beats past the end of a bar carry
    /// into the following bars.
    pub fn to_duration(&self, ts: &TimeSignature) -> Duration {
        let beat_len = ts.beat_duration();
        ts.bar_duration() * i64::from(self.bar)
            + beat_len * i64::from(self.beat)
            + beat_len.scale(self.remainder)
    }

    pub fn bar(&self) -> u32 {
        self.bar
    }

    pub fn beat(&self) -> u32 {
        self.beat
    }

    pub fn remainder(&self) -> Rational64 {
        self.remainder
    }

    /// Sits exactly on a beat.
    pub fn on_beat(&self) -> bool {
        self.remainder.is_zero()
    }

    /// Sits exactly on a barline.
    pub fn is_downbeat(&self) -> bool {
        self.beat == 0 && self.on_beat()
    }
}

impl Default for TimeSection {
    fn default() -> Self {
        TimeSection::START
    }
}

/// One-based, the way musicians count: `3.2` or `3.2+1/3`.
impl fmt::Display for TimeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.bar + 1, self.beat + 1)?;
        if !self.remainder.is_zero() {
            write!(f, "+{}", self.remainder)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_bars_beats_and_remainders() {
        let ts = TimeSignature::FOUR_FOUR;
        let at = |text: &str| TimeSection::from_duration(&ts, Duration::parse(text).unwrap()).unwrap();

        assert_eq!(at("0"), TimeSection::START);
        assert_eq!(at("4"), TimeSection::new(1, 0, Rational64::zero()).unwrap());
        assert_eq!(at("5/2"), TimeSection::new(0, 2, Rational64::new(1, 2)).unwrap());
        assert_eq!(at("29/3"), TimeSection::new(2, 1, Rational64::new(2, 3)).unwrap());
    }

    #[test]
    fn compound_meter_counts_eighth_beats() {
        let ts = TimeSignature::SIX_EIGHT;
        let section = TimeSection::from_duration(&ts, Duration::parse("13/4").unwrap()).unwrap();
        // 13/4 quarters = one 6/8 bar (3) + 1/4 quarter = half an eighth
        assert_eq!(section.bar(), 1);
        assert_eq!(section.beat(), 0);
        assert_eq!(section.remainder(), Rational64::new(1, 2));
    }

    #[test]
    fn round_trips_every_position_exactly() {
        for ts in [
            TimeSignature::FOUR_FOUR,
            TimeSignature::THREE_FOUR,
            TimeSignature::SIX_EIGHT,
            TimeSignature::new(7, 16).unwrap(),
            TimeSignature::new(5, 2).unwrap(),
        ] {
            for denom in [1, 2, 3, 5, 7, 12] {
                for numer in 0..(40 * denom) {
                    let offset = Duration::new(numer, denom).unwrap();
                    let section = TimeSection::from_duration(&ts, offset).unwrap();
                    assert!(section.beat() < ts.beats_per_bar());
                    assert_eq!(section.to_duration(&ts), offset, "{ts} at {offset}");
                }
            }
        }
    }

    #[test]
    fn rejects_negative_offsets_and_bad_remainders() {
        let ts = TimeSignature::FOUR_FOUR;
        assert!(matches!(
            TimeSection::from_duration(&ts, -Duration::QUARTER),
            Err(GrilleError::NegativePosition(_))
        ));
        assert!(TimeSection::new(0, 0, Rational64::one()).is_err());
        assert!(TimeSection::new(0, 0, Rational64::new(-1, 2)).is_err());
    }

    #[test]
    fn displays_one_based() {
        let section = TimeSection::new(2, 1, Rational64::new(1, 3)).unwrap();
        assert_eq!(section.to_string(), "3.2+1/3");
        assert_eq!(TimeSection::START.to_string(), "1.1");
        assert!(TimeSection::START.is_downbeat());
        assert!(!section.on_beat());
    }
}
