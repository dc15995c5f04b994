//! Spelled pitches.
//!
//! A [`Note`] keeps its letter, so `D##` and `E` stay distinct spellings
//! while comparing equal. Arithmetic moves letters and semitones together,
//! which is what keeps `C + b3` an `Eb` and never a `D#`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::interval::{accidentals, check_alteration, split_accidentals, Interval};
use crate::error::{GrilleError, Result};

/// Semitones above C of each natural letter.
pub const DIATONIC_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

const LETTERS: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

/// Latin solfège spellings accepted as aliases, longest first per letter.
const SOLFEGE: [(&str, u8); 9] = [
    ("sol", 4),
    ("do", 0),
    ("ut", 0),
    ("re", 1),
    ("mi", 2),
    ("fa", 3),
    ("la", 5),
    ("si", 6),
    ("ti", 6),
];

pub const MAX_OCTAVE: i32 = 10;

fn check_octave(octave: i32) -> Result<u8> {
    if !(0..=MAX_OCTAVE).contains(&octave) {
        return Err(GrilleError::OctaveOutOfRange(octave));
    }
    // range checked above
    Ok(octave as u8)
}

#[derive(Debug, Clone, Copy)]
pub struct Note {
    /// Diatonic index, 0 = C .. 6 = B
    index: u8,
    alteration: i8,
    octave: Option<u8>,
}

const fn natural(index: u8) -> Note {
    Note {
        index,
        alteration: 0,
        octave: None,
    }
}

impl Note {
    pub const C: Note = natural(0);
    pub const D: Note = natural(1);
    pub const E: Note = natural(2);
    pub const F: Note = natural(3);
    pub const G: Note = natural(4);
    pub const A: Note = natural(5);
    pub const B: Note = natural(6);

    pub fn new(index: u8, alteration: i32, octave: Option<i32>) -> Result<Self> {
        if index >= 7 {
            return Err(GrilleError::invalid("note index", index.to_string()));
        }
        Ok(Note {
            index,
            alteration: check_alteration(alteration)?,
            octave: octave.map(check_octave).transpose()?,
        })
    }

    /// Diatonic index, 0 = C .. 6 = B.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn alteration(&self) -> i8 {
        self.alteration
    }

    pub fn octave(&self) -> Option<u8> {
        self.octave
    }

    pub fn letter(&self) -> &'static str {
        LETTERS[usize::from(self.index)]
    }

    /// Absolute pitch in semitones: `semitone(letter) + alteration + 12 * octave`.
    /// Octave-less notes count from octave zero.
    pub fn pitch(&self) -> i32 {
        DIATONIC_SEMITONES[usize::from(self.index)]
            + i32::from(self.alteration)
            + 12 * i32::from(self.octave.unwrap_or(0))
    }

    /// Pitch class 0..12, ignoring octave and spelling.
    pub fn pitch_class(&self) -> u8 {
        // rem_euclid(12) fits in u8
        self.pitch().rem_euclid(12) as u8
    }

    pub fn with_octave(&self, octave: i32) -> Result<Note> {
        Ok(Note {
            octave: Some(check_octave(octave)?),
            ..*self
        })
    }

    pub fn without_octave(&self) -> Note {
        Note {
            octave: None,
            ..*self
        }
    }

    /// Same letter, accidental shifted by `delta` semitones.
    pub fn altered(&self, delta: i32) -> Result<Note> {
        Ok(Note {
            alteration: check_alteration(i32::from(self.alteration) + delta)?,
            ..*self
        })
    }

    /// MIDI key number, C4 = 60. Needs an octave.
    pub fn midi(&self) -> Result<u8> {
        if self.octave.is_none() {
            return Err(GrilleError::MidiRange(self.to_string()));
        }
        u8::try_from(self.pitch() + 12)
            .ok()
            .filter(|key| *key <= 127)
            .ok_or_else(|| GrilleError::MidiRange(self.to_string()))
    }

    /// Move by `diatonic` letters and `semitones` half steps, keeping the
    /// absolute pitch exact. The octave follows only when there is one.
    fn shifted(&self, diatonic: i32, semitones: i32) -> Result<Note> {
        let raw = i32::from(self.index) + diatonic;
        let index = raw.rem_euclid(7);
        let carry = raw.div_euclid(7);
        let alteration = DIATONIC_SEMITONES[usize::from(self.index)] + semitones
            + i32::from(self.alteration)
            - DIATONIC_SEMITONES[index as usize]
            - 12 * carry;

        Ok(Note {
            // rem_euclid(7) fits in u8
            index: index as u8,
            alteration: check_alteration(alteration)?,
            octave: self
                .octave
                .map(|o| check_octave(i32::from(o) + carry))
                .transpose()?,
        })
    }

    /// The note `interval` above this one.
    pub fn add(&self, interval: &Interval) -> Result<Note> {
        self.shifted(interval.diatonic(), interval.semitones())
    }

    /// The note `interval` below this one.
    pub fn sub(&self, interval: &Interval) -> Result<Note> {
        self.shifted(-interval.diatonic(), -interval.semitones())
    }

    /// Interval from this note up to `other`.
    ///
    /// When both notes carry octaves the full distance is measured and must
    /// not descend; otherwise the nearest upward interval within an octave is
    /// returned. Either way `self.add(&interval)` spells `other` again.
    pub fn interval_to(&self, other: &Note) -> Result<Interval> {
        let mut diatonic = i32::from(other.index) - i32::from(self.index);
        let mut semitones = (DIATONIC_SEMITONES[usize::from(other.index)]
            + i32::from(other.alteration))
            - (DIATONIC_SEMITONES[usize::from(self.index)] + i32::from(self.alteration));

        match (self.octave, other.octave) {
            (Some(from), Some(to)) => {
                let octaves = i32::from(to) - i32::from(from);
                diatonic += 7 * octaves;
                semitones += 12 * octaves;
            }
            _ => {
                if diatonic < 0 {
                    diatonic += 7;
                    semitones += 12;
                }
            }
        }
        Interval::from_span(diatonic, semitones)
    }

    /// Compare absolute pitch. Fails when only one side has an octave.
    pub fn try_cmp(&self, other: &Note) -> Result<Ordering> {
        if self.octave.is_some() != other.octave.is_some() {
            return Err(GrilleError::OctaveMismatch(
                self.to_string(),
                other.to_string(),
            ));
        }
        Ok(self.pitch().cmp(&other.pitch()))
    }
}

/// Equality is by pitch, never by spelling. Notes with and without an
/// octave are never equal; use [`Note::try_cmp`] to have that reported.
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other), Ok(Ordering::Equal))
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.octave.is_some().hash(state);
        self.pitch().hash(state);
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl FromStr for Note {
    type Err = GrilleError;

    /// `C`, `F#`, `Bb3`, `Ebb`, `sol#4`, `Re5`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let lower = text.to_ascii_lowercase();

        let solfege = SOLFEGE
            .iter()
            .find(|(alias, _)| lower.starts_with(alias));
        let (index, rest) = match solfege {
            Some((alias, index)) => (*index, &text[alias.len()..]),
            None => {
                let first = text
                    .chars()
                    .next()
                    .ok_or_else(|| GrilleError::invalid("note", s))?;
                let index = LETTERS
                    .iter()
                    .position(|l| l.eq_ignore_ascii_case(&first.to_string()))
                    .ok_or_else(|| GrilleError::invalid("note", s))?;
                // LETTERS has 7 entries
                (index as u8, &text[first.len_utf8()..])
            }
        };

        let (alteration, digits) = split_accidentals(rest);
        let octave = if digits.is_empty() {
            None
        } else {
            Some(
                digits
                    .parse::<i32>()
                    .map_err(|_| GrilleError::invalid("note", s))?,
            )
        };
        Note::new(index, alteration, octave)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), accidentals(self.alteration))?;
        if let Some(octave) = self.octave {
            write!(f, "{octave}")?;
        }
        Ok(())
    }
}
