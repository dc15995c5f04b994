//! Chord construction.
//!
//! A chord starts from a root (a note, or a degree read against a scale),
//! stacks its quality's intervals, then applies inversion, bass note and
//! extensions in that order. Every step validates; nothing is clamped.

use std::fmt;
use std::str::FromStr;

use super::degree::Degree;
use super::interval::{split_accidentals, Interval};
use super::note::Note;
use super::quality::ChordQuality;
use super::scale::Scale;
use crate::error::{GrilleError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    root: Note,
    quality: &'static ChordQuality,
    notes: Vec<Note>,
    inversion: usize,
    bass: Option<Note>,
    extensions: Vec<Interval>,
    degree: Option<Degree>,
    inferred: bool,
}

/// Collects the parts of a chord before validating them together.
#[derive(Debug, Clone, Default)]
pub struct ChordBuilder {
    root: Option<Note>,
    degree: Option<Degree>,
    quality: Option<String>,
    inversion: usize,
    bass: Option<Note>,
    extensions: Vec<Interval>,
    scale: Option<Scale>,
}

impl ChordBuilder {
    pub fn root(mut self, root: Note) -> Self {
        self.root = Some(root);
        self
    }

    pub fn degree(mut self, degree: Degree) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn inversion(mut self, inversion: usize) -> Self {
        self.inversion = inversion;
        self
    }

    pub fn bass(mut self, bass: Note) -> Self {
        self.bass = Some(bass);
        self
    }

    pub fn extension(mut self, interval: Interval) -> Self {
        self.extensions.push(interval);
        self
    }

    pub fn extensions(mut self, intervals: impl IntoIterator<Item = Interval>) -> Self {
        self.extensions.extend(intervals);
        self
    }

    pub fn scale(mut self, scale: &Scale) -> Self {
        self.scale = Some(scale.clone());
        self
    }

    pub fn build(self) -> Result<Chord> {
        let root = match (self.root, &self.degree) {
            (Some(root), _) => root,
            (None, Some(degree)) => {
                let scale = self
                    .scale
                    .as_ref()
                    .ok_or_else(|| GrilleError::MissingScale(degree.to_string()))?;
                degree.resolve(scale)?
            }
            (None, None) => return Err(GrilleError::invalid("chord", "no root or degree")),
        };

        let (quality, inferred) = match (&self.quality, &self.degree, &self.scale) {
            (Some(name), _, _) => (ChordQuality::lookup(name)?, false),
            (None, Some(degree), Some(scale)) if self.root.is_none() => {
                (scale.seventh_quality(degree.position())?, true)
            }
            _ => (ChordQuality::lookup("maj")?, false),
        };

        let mut notes = quality
            .intervals
            .iter()
            .map(|interval| root.add(interval))
            .collect::<Result<Vec<_>>>()?;

        if self.inversion >= notes.len() {
            return Err(GrilleError::InversionOutOfRange {
                inversion: self.inversion,
                max: notes.len() - 1,
            });
        }
        if self.inversion > 0 {
            let lifted = notes[..self.inversion]
                .iter()
                .map(|note| note.add(&Interval::OCTAVE))
                .collect::<Result<Vec<_>>>()?;
            notes.drain(..self.inversion);
            notes.extend(lifted);
        }

        let bass = self.bass.map(|bass| place_bass(root, bass)).transpose()?;
        if let Some(bass) = bass {
            notes.insert(0, bass);
        }

        if !self.extensions.is_empty() {
            for interval in &self.extensions {
                notes.push(root.add(interval)?);
            }
            if root.octave().is_some() {
                notes.sort_by_key(Note::pitch);
            }
        }

        Ok(Chord {
            root,
            quality,
            notes,
            inversion: self.inversion,
            bass,
            extensions: self.extensions,
            degree: self.degree,
            inferred,
        })
    }
}

/// Give an octave-less bass the root's octave, one lower if that would put
/// it above the root.
fn place_bass(root: Note, bass: Note) -> Result<Note> {
    match (root.octave(), bass.octave()) {
        (Some(octave), None) => {
            let octave = i32::from(octave);
            let placed = bass.with_octave(octave)?;
            if placed.pitch() > root.pitch() {
                bass.with_octave(octave - 1)
            } else {
                Ok(placed)
            }
        }
        _ => Ok(bass),
    }
}

impl Chord {
    pub fn builder() -> ChordBuilder {
        ChordBuilder::default()
    }

    /// Root position chord with no modifiers.
    pub fn new(root: Note, quality: &str) -> Result<Self> {
        Chord::builder().root(root).quality(quality).build()
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn quality(&self) -> &'static ChordQuality {
        self.quality
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// The quality's intervals above the root, before any modifier.
    pub fn intervals(&self) -> &'static [Interval] {
        self.quality.intervals
    }

    pub fn inversion(&self) -> usize {
        self.inversion
    }

    pub fn bass(&self) -> Option<Note> {
        self.bass
    }

    pub fn extensions(&self) -> &[Interval] {
        &self.extensions
    }

    /// The degree the chord was built from, if any.
    pub fn degree(&self) -> Option<Degree> {
        self.degree
    }

    /// Quality came from the scale rather than being named.
    pub fn is_quality_inferred(&self) -> bool {
        self.inferred
    }

    /// `D_min7`: root spelling and quality name.
    pub fn symbol(&self) -> String {
        format!("{}_{}", self.root.without_octave(), self.quality.name)
    }

    /// Compact text form, `A4maj7:i=1:b=E:e=9`. Chords built from a degree
    /// are written with the degree, and an inferred quality is left out.
    pub fn notation(&self) -> String {
        let mut text = match self.degree {
            Some(degree) => degree.to_string(),
            None => self.root.to_string(),
        };
        if !self.inferred {
            text.push_str(self.quality.name);
        }
        if self.inversion > 0 {
            text.push_str(&format!(":i={}", self.inversion));
        }
        if let Some(bass) = self.bass {
            text.push_str(&format!(":b={bass}"));
        }
        if !self.extensions.is_empty() {
            let extensions: Vec<String> = self.extensions.iter().map(ToString::to_string).collect();
            text.push_str(&format!(":e={}", extensions.join(",")));
        }
        text
    }

    /// Notes with concrete octaves, each strictly above the one before.
    /// Octave-less notes are stacked upward from `octave`; notes that
    /// already carry one keep it.
    pub fn voiced(&self, octave: u8) -> Result<Vec<Note>> {
        let mut current = i32::from(octave);
        let mut voiced: Vec<Note> = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            if let Some(own) = note.octave() {
                current = i32::from(own);
                voiced.push(*note);
                continue;
            }
            let mut placed = note.with_octave(current)?;
            if let Some(previous) = voiced.last() {
                while placed.pitch() <= previous.pitch() {
                    current += 1;
                    placed = note.with_octave(current)?;
                }
            }
            voiced.push(placed);
        }
        Ok(voiced)
    }

    /// MIDI keys of [`Chord::voiced`].
    pub fn midi_notes(&self, octave: u8) -> Result<Vec<u8>> {
        self.voiced(octave)?.iter().map(Note::midi).collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

impl FromStr for Chord {
    type Err = GrilleError;

    /// `D_min7`, `Cmaj7`, `F#m`, `A4maj7`, `C7` (dominant), `C47` (C4, dominant).
    ///
    /// Digits after the note are read as the quality when they name one,
    /// otherwise the leading one or two digits are the octave.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if let Some((root, quality)) = text.split_once('_') {
            return Chord::new(root.parse()?, quality);
        }

        let first = text
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(|| GrilleError::invalid("chord", s))?;
        let (_, rest) = split_accidentals(&text[first.len_utf8()..]);
        let letter = &text[..text.len() - rest.len()];

        if ChordQuality::lookup(rest).is_ok() {
            return Chord::new(letter.parse()?, rest);
        }
        for digits in 1..=2 {
            let Some(octave) = rest.get(..digits).filter(|d| d.chars().all(|c| c.is_ascii_digit()))
            else {
                break;
            };
            let quality = &rest[digits..];
            if ChordQuality::lookup(quality).is_ok() {
                return Chord::new(format!("{letter}{octave}").parse()?, quality);
            }
        }
        Err(GrilleError::invalid("chord", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Note {
        text.parse().unwrap()
    }

    fn spelled(notes: &[Note]) -> Vec<String> {
        notes.iter().map(ToString::to_string).collect()
    }

    fn c_major() -> Scale {
        "C_major".parse().unwrap()
    }

    #[test]
    fn default_quality_is_major() {
        let chord = Chord::builder().root(note("E")).build().unwrap();
        assert_eq!(chord.symbol(), "E_maj");
        assert_eq!(spelled(chord.notes()), ["E", "G#", "B"]);
    }

    #[test]
    fn bare_degree_infers_the_diatonic_seventh() {
        let tonic = Chord::builder()
            .degree(Degree::TONIC)
            .scale(&c_major())
            .build()
            .unwrap();
        assert_eq!(spelled(tonic.notes()), ["C", "E", "G", "B"]);
        assert!(tonic.is_quality_inferred());
        assert_eq!(tonic.notation(), "I");

        let two = Chord::builder()
            .degree("II".parse().unwrap())
            .scale(&c_major())
            .build()
            .unwrap();
        assert_eq!(two.symbol(), "D_min7");

        let named = Chord::builder()
            .degree("V".parse().unwrap())
            .quality("maj")
            .scale(&c_major())
            .build()
            .unwrap();
        assert_eq!(spelled(named.notes()), ["G", "B", "D"]);
        assert_eq!(named.notation(), "Vmaj");
    }

    #[test]
    fn degree_without_scale_is_an_error() {
        let result = Chord::builder().degree(Degree::TONIC).build();
        assert!(matches!(result, Err(GrilleError::MissingScale(_))));
        assert!(Chord::builder().build().is_err());
    }

    #[test]
    fn inversion_rotates_and_lifts() {
        let root = Chord::new(note("C4"), "maj").unwrap();
        let first = Chord::builder()
            .root(note("C4"))
            .inversion(1)
            .build()
            .unwrap();
        let zero = Chord::builder()
            .root(note("C4"))
            .inversion(0)
            .build()
            .unwrap();

        assert_eq!(zero.notes(), root.notes());
        assert_eq!(spelled(first.notes()), ["E4", "G4", "C5"]);
    }

    #[test]
    fn inversion_out_of_range_always_fails() {
        for (quality, len) in [("maj", 3), ("7", 4), ("9", 5), ("5", 2)] {
            for inversion in len..len + 3 {
                let result = Chord::builder()
                    .root(note("D"))
                    .quality(quality)
                    .inversion(inversion)
                    .build();
                assert!(
                    matches!(result, Err(GrilleError::InversionOutOfRange { max, .. }) if max == len - 1),
                    "{quality} inversion {inversion}"
                );
            }
        }
    }

    #[test]
    fn bass_note_sits_below_the_root() {
        let slash = Chord::builder()
            .root(note("C4"))
            .bass(note("G"))
            .build()
            .unwrap();
        assert_eq!(spelled(slash.notes()), ["G3", "C4", "E4", "G4"]);

        let low = Chord::builder()
            .root(note("E4"))
            .quality("min")
            .bass(note("C"))
            .build()
            .unwrap();
        assert_eq!(low.notes()[0].to_string(), "C4");

        assert!(Chord::builder()
            .root(note("C0"))
            .bass(note("D"))
            .build()
            .is_err());
    }

    #[test]
    fn extensions_are_sorted_into_place() {
        let chord = Chord::builder()
            .root(note("A4"))
            .quality("maj7")
            .inversion(1)
            .extension("9".parse().unwrap())
            .build()
            .unwrap();
        assert_eq!(spelled(chord.notes()), ["C#5", "E5", "G#5", "A5", "B5"]);
        assert_eq!(chord.notation(), "A4maj7:i=1:e=9");

        let open = Chord::builder()
            .root(note("C"))
            .extension("9".parse().unwrap())
            .build()
            .unwrap();
        assert_eq!(spelled(open.notes()), ["C", "E", "G", "D"]);
    }

    #[test]
    fn voicing_stacks_upward() {
        let chord = Chord::builder()
            .degree("V".parse().unwrap())
            .scale(&c_major())
            .bass(note("B"))
            .build()
            .unwrap();
        let voiced = chord.voiced(3).unwrap();
        assert_eq!(spelled(&voiced), ["B3", "G4", "B4", "D5", "F5"]);
        assert_eq!(chord.midi_notes(3).unwrap(), [59, 67, 71, 74, 77]);
        assert!(voiced.windows(2).all(|w| w[0] < w[1]));
        assert!(chord.voiced(10).is_err());
    }

    #[test]
    fn parses_symbols() {
        assert_eq!("D_min7".parse::<Chord>().unwrap().symbol(), "D_min7");
        assert_eq!("F#m".parse::<Chord>().unwrap().symbol(), "F#_min");
        assert_eq!("Bb".parse::<Chord>().unwrap().symbol(), "Bb_maj");
        assert_eq!("C7".parse::<Chord>().unwrap().symbol(), "C_7");
        let a = "A4maj7".parse::<Chord>().unwrap();
        assert_eq!(a.root().octave(), Some(4));
        assert_eq!(a.symbol(), "A_maj7");
        assert_eq!("C47".parse::<Chord>().unwrap().notation(), "C47");
        assert!("Cxyz".parse::<Chord>().is_err());
        assert!("7".parse::<Chord>().is_err());
    }
}
