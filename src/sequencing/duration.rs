use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};
use std::str::FromStr;

use num_rational::Rational64;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{GrilleError, Result};

/// Span of musical time, measured in quarter notes.
/// Stored as an exact rational so tuplets never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(Rational64);

impl Duration {
    pub const ZERO: Duration = Duration(Rational64::new_raw(0, 1));

    // Standard note values
    pub const WHOLE: Duration = Duration(Rational64::new_raw(4, 1));
    pub const HALF: Duration = Duration(Rational64::new_raw(2, 1));
    pub const QUARTER: Duration = Duration(Rational64::new_raw(1, 1));
    pub const EIGHTH: Duration = Duration(Rational64::new_raw(1, 2));
    pub const SIXTEENTH: Duration = Duration(Rational64::new_raw(1, 4));
    pub const THIRTY_SECOND: Duration = Duration(Rational64::new_raw(1, 8));

    // Convenience constants for common dotted notes
    pub const DOTTED_HALF: Duration = Duration(Rational64::new_raw(3, 1));
    pub const DOTTED_QUARTER: Duration = Duration(Rational64::new_raw(3, 2));
    pub const DOTTED_EIGHTH: Duration = Duration(Rational64::new_raw(3, 4));

    // Convenience constants for common triplets
    pub const QUARTER_TRIPLET: Duration = Duration(Rational64::new_raw(2, 3));
    pub const EIGHTH_TRIPLET: Duration = Duration(Rational64::new_raw(1, 3));

    /// Build `numer/denom` quarter notes.
    pub fn new(numer: i64, denom: i64) -> Result<Self> {
        if denom == 0 {
            return Err(GrilleError::ZeroDenominator(format!("{numer}/{denom}")));
        }
        Ok(Duration(Rational64::new(numer, denom)))
    }

    pub fn from_quarters(quarters: i64) -> Self {
        Duration(Rational64::from_integer(quarters))
    }

    pub fn from_ratio(ratio: Rational64) -> Self {
        Duration(ratio)
    }

    pub fn ratio(self) -> Rational64 {
        self.0
    }

    pub fn numer(self) -> i64 {
        *self.0.numer()
    }

    pub fn denom(self) -> i64 {
        *self.0.denom()
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    /// Parse duration notation: `[numer][/denom][W|H|Q|E|S]`.
    ///
    /// The optional fraction scales the base symbol (W=4, H=2, Q=1, E=1/2,
    /// S=1/4 quarters). Without a symbol the fraction is taken in quarters,
    /// so `"1/3Q"`, `"1/3"` and `"2/3E"` are all the same triplet quarter.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (fraction, base) = match trimmed.chars().last() {
            Some(symbol) if symbol.is_ascii_alphabetic() => {
                let base = match symbol.to_ascii_uppercase() {
                    'W' => Duration::WHOLE,
                    'H' => Duration::HALF,
                    'Q' => Duration::QUARTER,
                    'E' => Duration::EIGHTH,
                    'S' => Duration::SIXTEENTH,
                    _ => return Err(GrilleError::invalid("duration", text)),
                };
                (&trimmed[..trimmed.len() - 1], Some(base))
            }
            Some(_) => (trimmed, None),
            None => return Err(GrilleError::invalid("duration", text)),
        };

        if fraction.is_empty() {
            return base.ok_or_else(|| GrilleError::invalid("duration", text));
        }

        let (numer, denom) = match fraction.split_once('/') {
            Some((n, d)) => (n, Some(d)),
            None => (fraction, None),
        };
        let numer: i64 = if numer.is_empty() {
            1
        } else {
            numer
                .parse()
                .map_err(|_| GrilleError::invalid("duration", text))?
        };
        let denom: i64 = match denom {
            Some(d) => d
                .parse()
                .map_err(|_| GrilleError::invalid("duration", text))?,
            None => 1,
        };
        if numer < 0 || denom < 0 {
            return Err(GrilleError::invalid("duration", text));
        }
        if denom == 0 {
            return Err(GrilleError::ZeroDenominator(text.to_string()));
        }

        let fraction = Duration(Rational64::new(numer, denom));
        Ok(match base {
            Some(base) => Duration(fraction.0 * base.0),
            None => fraction,
        })
    }

    /// Apply a dot: multiply duration by 3/2 (increases by 50%)
    pub fn dotted(self) -> Self {
        Duration(self.0 * Rational64::new_raw(3, 2))
    }

    /// Create a triplet: multiply duration by 2/3
    /// (three notes in the time of two)
    pub fn triplet(self) -> Self {
        self.tuplet(2, 3)
    }

    /// General tuplet: `played` notes in the time of `in_time_of` notes
    /// E.g., `.tuplet(2, 3)` = triplet (3 in time of 2)
    ///       `.tuplet(4, 5)` = quintuplet (5 in time of 4)
    pub fn tuplet(self, in_time_of: i64, played: i64) -> Self {
        Duration(self.0 * Rational64::new(in_time_of, played))
    }

    /// Scale by an exact ratio.
    pub fn scale(self, factor: Rational64) -> Self {
        Duration(self.0 * factor)
    }

    /// How many whole `rhs` spans fit into `self`, rounding toward negative
    /// infinity. Panics if `rhs` is zero, like integer division.
    pub fn div_floor(self, rhs: Duration) -> i64 {
        (self.0 / rhs.0).floor().to_integer()
    }

    /// Ratio between two durations (`self / rhs`).
    pub fn ratio_to(self, rhs: Duration) -> Rational64 {
        self.0 / rhs.0
    }

    /// Convert this duration to integer ticks, truncating sub-tick remainders.
    /// ppq = pulses per quarter note (standard MIDI timing resolution)
    pub fn to_ticks(&self, ppq: u32) -> i64 {
        (self.0 * Rational64::from_integer(i64::from(ppq)))
            .floor()
            .to_integer()
    }

    /// Lossy view for display and wall-clock conversion only.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::ZERO
    }
}

impl FromStr for Duration {
    type Err = GrilleError;

    fn from_str(s: &str) -> Result<Self> {
        Duration::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.0;
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0 * Rational64::from_integer(rhs))
    }
}

impl Div<i64> for Duration {
    type Output = Duration;

    fn div(self, rhs: i64) -> Duration {
        Duration(self.0 / Rational64::from_integer(rhs))
    }
}

/// Euclidean-style modulo: the result has the sign of `rhs`.
impl Rem for Duration {
    type Output = Duration;

    fn rem(self, rhs: Duration) -> Duration {
        let whole = self.div_floor(rhs);
        self - rhs * whole
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_durations_to_ticks() {
        let ppq = 480; // Standard MIDI ppq

        // Whole note = 4 quarters = 4 * 480 = 1920 ticks
        assert_eq!(Duration::WHOLE.to_ticks(ppq), 1920);
        assert_eq!(Duration::HALF.to_ticks(ppq), 960);
        assert_eq!(Duration::QUARTER.to_ticks(ppq), 480);
        assert_eq!(Duration::EIGHTH.to_ticks(ppq), 240);
        assert_eq!(Duration::SIXTEENTH.to_ticks(ppq), 120);
    }

    #[test]
    fn test_dotted_notes() {
        let ppq = 480;

        assert_eq!(Duration::QUARTER.dotted().to_ticks(ppq), 720);
        assert_eq!(Duration::DOTTED_QUARTER.to_ticks(ppq), 720);
        assert_eq!(Duration::EIGHTH.dotted(), Duration::DOTTED_EIGHTH);
    }

    #[test]
    fn test_triplets() {
        assert_eq!(Duration::QUARTER.triplet(), Duration::QUARTER_TRIPLET);
        assert_eq!(Duration::EIGHTH.triplet(), Duration::EIGHTH_TRIPLET);
        assert_eq!(Duration::QUARTER.triplet().to_ticks(480), 320);
    }

    #[test]
    fn test_general_tuplets() {
        // Quintuplet: 5 eighths in time of 4 eighths = 2/5 of a quarter
        let quintuplet = Duration::EIGHTH.tuplet(4, 5);
        assert_eq!(quintuplet, Duration::new(2, 5).unwrap());
        assert_eq!(quintuplet * 5, Duration::HALF);
    }

    #[test]
    fn test_chained_operations() {
        // Eighth dotted then triplet lands back on an eighth
        let weird = Duration::EIGHTH.dotted().triplet();
        assert_eq!(weird, Duration::EIGHTH);
    }

    #[test]
    fn test_parse_symbols_and_fractions() {
        assert_eq!(Duration::parse("Q").unwrap(), Duration::QUARTER);
        assert_eq!(Duration::parse("W").unwrap(), Duration::WHOLE);
        assert_eq!(Duration::parse("3E").unwrap(), Duration::DOTTED_QUARTER);
        assert_eq!(Duration::parse("1/3Q").unwrap(), Duration::EIGHTH_TRIPLET);
        assert_eq!(Duration::parse("2/3E").unwrap(), Duration::EIGHTH_TRIPLET);
        assert_eq!(Duration::parse("1").unwrap(), Duration::QUARTER);
        assert_eq!(Duration::parse("3/2").unwrap(), Duration::DOTTED_QUARTER);
        assert_eq!(Duration::parse("s").unwrap(), Duration::SIXTEENTH);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Duration::parse("1/0Q"),
            Err(GrilleError::ZeroDenominator(_))
        ));
        assert!(Duration::new(1, 0).is_err());
        assert!(Duration::parse("").is_err());
        assert!(Duration::parse("X").is_err());
        assert!(Duration::parse("1/aQ").is_err());
        assert!(Duration::parse("-1").is_err());
    }

    #[test]
    fn test_tuplet_fractions_are_exact() {
        let one = Duration::parse("1").unwrap();
        for n in [3, 5, 6, 7, 9, 11] {
            let part = Duration::parse(&format!("1/{n}Q")).unwrap();
            assert_eq!(part * n, one, "1/{n}Q * {n}");

            let summed: Duration = std::iter::repeat(part).take(n as usize).sum();
            assert_eq!(summed, one);
        }
    }

    #[test]
    fn test_modulo_and_floor_division() {
        let bar = Duration::WHOLE;
        let pos = Duration::parse("9/2").unwrap();
        assert_eq!(pos.div_floor(bar), 1);
        assert_eq!(pos % bar, Duration::EIGHTH);

        let before = -Duration::QUARTER;
        assert_eq!(before.div_floor(bar), -1);
        assert_eq!(before % bar, Duration::DOTTED_HALF);
    }

    #[test]
    fn test_ordering_and_display() {
        assert!(Duration::EIGHTH < Duration::QUARTER);
        assert!(Duration::QUARTER_TRIPLET > Duration::EIGHTH);
        assert_eq!(Duration::WHOLE.to_string(), "4");
        assert_eq!(Duration::EIGHTH_TRIPLET.to_string(), "1/3");
        assert_eq!((Duration::HALF - Duration::HALF), Duration::ZERO);
    }
}
