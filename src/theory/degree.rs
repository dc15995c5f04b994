use std::fmt;
use std::str::FromStr;

use super::interval::{accidentals, check_alteration, split_accidentals, Interval};
use super::note::Note;
use super::scale::Scale;
use crate::error::{GrilleError, Result};

const ROMAN: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A scale step, optionally relative to another step (`V/V`).
///
/// Degrees are abstract until resolved against a [`Scale`]; the same `II`
/// is `D` in C major and `B` in A minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Degree {
    index: u8,
    alteration: i8,
    base: Option<(u8, i8)>,
}

fn check_index(index: u8) -> Result<u8> {
    if index >= 7 {
        return Err(GrilleError::UnknownDegree {
            index: usize::from(index),
            len: 7,
        });
    }
    Ok(index)
}

fn parse_step(text: &str, whole: &str) -> Result<(u8, i8)> {
    let (alteration, rest) = split_accidentals(text.trim());
    let index = if rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty() {
        rest.parse::<u8>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| GrilleError::invalid("degree", whole))?
    } else {
        ROMAN
            .iter()
            .position(|r| r.eq_ignore_ascii_case(rest))
            // ROMAN has 7 entries
            .map(|i| i as u8)
            .ok_or_else(|| GrilleError::invalid("degree", whole))?
    };
    Ok((check_index(index)?, check_alteration(alteration)?))
}

impl Degree {
    pub const TONIC: Degree = Degree {
        index: 0,
        alteration: 0,
        base: None,
    };

    /// `index` is 0-based: 0 is the tonic, 4 the dominant.
    pub fn new(index: u8, alteration: i32) -> Result<Self> {
        Ok(Degree {
            index: check_index(index)?,
            alteration: check_alteration(alteration)?,
            base: None,
        })
    }

    /// This degree taken relative to `base` (`V` over `V` gives `V/V`).
    pub fn over(self, base: Degree) -> Degree {
        Degree {
            base: Some((base.index, base.alteration)),
            ..self
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn alteration(&self) -> i8 {
        self.alteration
    }

    pub fn base(&self) -> Option<Degree> {
        self.base.map(|(index, alteration)| Degree {
            index,
            alteration,
            base: None,
        })
    }

    /// Combined step, folded into one octave. Used to pick the diatonic
    /// chord quality of a secondary degree.
    pub fn position(&self) -> usize {
        let base = self.base.map_or(0, |(index, _)| usize::from(index));
        (usize::from(self.index) + base) % 7
    }

    /// The note this degree names in `scale`.
    pub fn resolve(&self, scale: &Scale) -> Result<Note> {
        let len = scale.notes().len();
        let (base_index, base_alteration) = self.base.unwrap_or((0, 0));
        let mut index = usize::from(self.index) + usize::from(base_index);
        let mut octaves = 0;
        if index >= len {
            index -= len;
            octaves += 1;
        }
        let note = scale
            .notes()
            .get(index)
            .ok_or(GrilleError::UnknownDegree { index, len })?;

        let mut note =
            note.altered(i32::from(self.alteration) + i32::from(base_alteration))?;
        for _ in 0..octaves {
            note = note.add(&Interval::OCTAVE)?;
        }
        Ok(note)
    }
}

impl FromStr for Degree {
    type Err = GrilleError;

    /// `I`, `bVII`, `#iv`, `V/V`, `5`, `b3`.
    fn from_str(s: &str) -> Result<Self> {
        let (step, base) = match s.split_once('/') {
            Some((step, base)) => (step, Some(parse_step(base, s)?)),
            None => (s, None),
        };
        let (index, alteration) = parse_step(step, s)?;
        Ok(Degree {
            index,
            alteration,
            base,
        })
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            accidentals(self.alteration),
            ROMAN[usize::from(self.index)]
        )?;
        if let Some((index, alteration)) = self.base {
            write!(f, "/{}{}", accidentals(alteration), ROMAN[usize::from(index)])?;
        }
        Ok(())
    }
}
