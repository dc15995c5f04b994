use std::fmt;
use std::str::FromStr;

use super::chord::Chord;
use super::degree::Degree;
use super::interval::Interval;
use super::note::Note;
use super::quality::{ChordQuality, ScaleQuality};
use crate::error::{GrilleError, Result};

/// Thirds stacked from each degree: root, third, fifth, seventh.
pub const SEVENTH_STEPS: [usize; 4] = [1, 3, 5, 7];
pub const TRIAD_STEPS: [usize; 3] = [1, 3, 5];

/// A tonic and a quality, with the notes they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    tonic: Note,
    quality: &'static ScaleQuality,
    notes: Vec<Note>,
}

impl Scale {
    pub fn new(tonic: Note, quality: &str) -> Result<Self> {
        let quality = ScaleQuality::lookup(quality)?;
        let notes = quality
            .intervals
            .iter()
            .map(|interval| tonic.add(interval))
            .collect::<Result<Vec<_>>>()?;
        Ok(Scale {
            tonic,
            quality,
            notes,
        })
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn quality(&self) -> &'static ScaleQuality {
        self.quality
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn intervals(&self) -> &'static [Interval] {
        self.quality.intervals
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Seven notes, one per letter: the only scales with diatonic chords.
    pub fn is_diatonic(&self) -> bool {
        self.notes.len() == 7
    }

    fn require_diatonic(&self) -> Result<()> {
        if !self.is_diatonic() {
            return Err(GrilleError::NotDiatonic {
                name: self.to_string(),
                notes: self.notes.len(),
            });
        }
        Ok(())
    }

    /// Intervals above degree `position` reached by taking the given
    /// 1-based scale steps. Steps may run into the second octave.
    fn stack(&self, position: usize, steps: &[usize]) -> Result<Vec<Interval>> {
        let intervals = self.quality.intervals;
        let len = intervals.len();
        let from = intervals[position % len];

        steps
            .iter()
            .map(|step| {
                let j = position + step.saturating_sub(1);
                let (octave, k) = ((j / len) as i32, j % len);
                let to = intervals[k];
                Interval::from_span(
                    to.diatonic() + 7 * octave - from.diatonic(),
                    to.semitones() + 12 * octave - from.semitones(),
                )
            })
            .collect()
    }

    /// Quality of the chord stacked on `position` (0-based) with `steps`.
    pub fn chord_quality(&self, position: usize, steps: &[usize]) -> Result<&'static ChordQuality> {
        self.require_diatonic()?;
        ChordQuality::classify(&self.stack(position, steps)?)
    }

    /// Quality of the diatonic seventh chord on `position`.
    pub fn seventh_quality(&self, position: usize) -> Result<&'static ChordQuality> {
        self.chord_quality(position, &SEVENTH_STEPS)
    }

    /// One chord per degree, stacked with `steps`.
    pub fn diatonic_chords(&self, steps: &[usize]) -> Result<Vec<Chord>> {
        self.require_diatonic()?;
        (0..7u8)
            .map(|index| {
                let quality = self.chord_quality(usize::from(index), steps)?;
                Chord::builder()
                    .degree(Degree::new(index, 0)?)
                    .scale(self)
                    .quality(quality.name)
                    .build()
            })
            .collect()
    }

    pub fn diatonic_sevenths(&self) -> Result<Vec<Chord>> {
        self.diatonic_chords(&SEVENTH_STEPS)
    }

    pub fn diatonic_triads(&self) -> Result<Vec<Chord>> {
        self.diatonic_chords(&TRIAD_STEPS)
    }
}

impl FromStr for Scale {
    type Err = GrilleError;

    /// `C_major`, `F#_harmonic_minor`, `Bb3 dorian`.
    fn from_str(s: &str) -> Result<Self> {
        let (tonic, quality) = s
            .trim()
            .split_once(['_', ' '])
            .ok_or_else(|| GrilleError::invalid("scale", s))?;
        Scale::new(tonic.parse()?, quality)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.tonic, self.quality.name)
    }
}
