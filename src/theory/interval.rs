use std::fmt;
use std::str::FromStr;

use crate::error::{GrilleError, Result};

/// Semitone span of each plain interval number, unison (1) through double
/// octave (15): major/perfect qualities.
const INTERVAL_SEMITONES: [i32; 15] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16, 17, 19, 21, 23, 24];

/// Largest accidental accepted anywhere in the theory layer.
pub const MAX_ALTERATION: i32 = 3;

pub(crate) fn check_alteration(alteration: i32) -> Result<i8> {
    if alteration.abs() > MAX_ALTERATION {
        return Err(GrilleError::AlterationOutOfRange(alteration));
    }
    // range checked above
    Ok(alteration as i8)
}

/// Split leading `#`/`b` accidentals off a token.
pub(crate) fn split_accidentals(text: &str) -> (i32, &str) {
    let mut alteration = 0;
    for (i, c) in text.char_indices() {
        match c {
            '#' => alteration += 1,
            'b' => alteration -= 1,
            _ => return (alteration, &text[i..]),
        }
    }
    (alteration, "")
}

pub(crate) fn accidentals(alteration: i8) -> String {
    let symbol = if alteration > 0 { "#" } else { "b" };
    symbol.repeat(alteration.unsigned_abs() as usize)
}

/// Diatonic interval: a number from 1 (unison) to 15 (double octave) plus an
/// alteration relative to the major/perfect interval of that number.
///
/// `b3` is a minor third, `#4` an augmented fourth, `bb7` a diminished seventh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    number: u8,
    alteration: i8,
}

pub(crate) const fn iv(number: u8, alteration: i8) -> Interval {
    Interval { number, alteration }
}

impl Interval {
    pub const UNISON: Interval = iv(1, 0);
    pub const MINOR_SECOND: Interval = iv(2, -1);
    pub const MAJOR_SECOND: Interval = iv(2, 0);
    pub const MINOR_THIRD: Interval = iv(3, -1);
    pub const MAJOR_THIRD: Interval = iv(3, 0);
    pub const PERFECT_FOURTH: Interval = iv(4, 0);
    pub const TRITONE: Interval = iv(4, 1);
    pub const PERFECT_FIFTH: Interval = iv(5, 0);
    pub const MINOR_SEVENTH: Interval = iv(7, -1);
    pub const MAJOR_SEVENTH: Interval = iv(7, 0);
    pub const OCTAVE: Interval = iv(8, 0);

    pub fn new(number: u8, alteration: i32) -> Result<Self> {
        if !(1..=15).contains(&number) {
            return Err(GrilleError::UnknownInterval {
                diatonic: i32::from(number) - 1,
            });
        }
        Ok(iv(number, check_alteration(alteration)?))
    }

    /// Interval spanning `diatonic` letter steps and `semitones` half steps.
    pub fn from_span(diatonic: i32, semitones: i32) -> Result<Self> {
        let plain = usize::try_from(diatonic)
            .ok()
            .and_then(|i| INTERVAL_SEMITONES.get(i))
            .ok_or(GrilleError::UnknownInterval { diatonic })?;
        // diatonic < 15 here
        Interval::new(diatonic as u8 + 1, semitones - plain)
    }

    /// Interval number, 1-based (3 for a third).
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn alteration(&self) -> i8 {
        self.alteration
    }

    /// Letter steps spanned, 0-based (2 for a third).
    pub fn diatonic(&self) -> i32 {
        i32::from(self.number) - 1
    }

    /// Half steps spanned.
    pub fn semitones(&self) -> i32 {
        INTERVAL_SEMITONES[usize::from(self.number - 1)] + i32::from(self.alteration)
    }

    /// Same interval folded into a single octave (9 becomes 2).
    pub fn simple(&self) -> Interval {
        if self.number > 8 {
            iv(self.number - 7, self.alteration)
        } else {
            *self
        }
    }
}

impl FromStr for Interval {
    type Err = GrilleError;

    fn from_str(s: &str) -> Result<Self> {
        let (alteration, rest) = split_accidentals(s.trim());
        let number: u8 = rest
            .parse()
            .map_err(|_| GrilleError::invalid("interval", s))?;
        Interval::new(number, alteration)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", accidentals(self.alteration), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_numbers_to_spans() {
        assert_eq!(Interval::MAJOR_THIRD.semitones(), 4);
        assert_eq!(Interval::MINOR_THIRD.semitones(), 3);
        assert_eq!(Interval::PERFECT_FIFTH.diatonic(), 4);
        assert_eq!(Interval::OCTAVE.semitones(), 12);
        assert_eq!("b9".parse::<Interval>().unwrap().semitones(), 13);
        assert_eq!("#11".parse::<Interval>().unwrap().semitones(), 18);
        assert_eq!("13".parse::<Interval>().unwrap().semitones(), 21);
        assert_eq!("bb7".parse::<Interval>().unwrap().semitones(), 9);
    }

    #[test]
    fn from_span_recovers_alteration() {
        assert_eq!(Interval::from_span(2, 3).unwrap(), Interval::MINOR_THIRD);
        assert_eq!(Interval::from_span(3, 6).unwrap(), Interval::TRITONE);
        assert_eq!(Interval::from_span(0, -1).unwrap(), iv(1, -1));
        assert!(matches!(
            Interval::from_span(15, 25),
            Err(GrilleError::UnknownInterval { .. })
        ));
        assert!(Interval::from_span(-1, 0).is_err());
        assert!(matches!(
            Interval::from_span(2, 8),
            Err(GrilleError::AlterationOutOfRange(4))
        ));
    }

    #[test]
    fn parses_and_displays() {
        for text in ["1", "b3", "#5", "bb7", "9", "#11", "b13", "15"] {
            assert_eq!(text.parse::<Interval>().unwrap().to_string(), text);
        }
        assert!("16".parse::<Interval>().is_err());
        assert!("0".parse::<Interval>().is_err());
        assert!("bbbb3".parse::<Interval>().is_err());
        assert!("x".parse::<Interval>().is_err());
    }

    #[test]
    fn simple_folds_compound_intervals() {
        assert_eq!("9".parse::<Interval>().unwrap().simple(), Interval::MAJOR_SECOND);
        assert_eq!(Interval::OCTAVE.simple(), Interval::OCTAVE);
    }
}
