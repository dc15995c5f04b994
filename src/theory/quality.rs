//! Canonical scale and chord qualities.
//!
//! Every quality is a name, a handful of aliases and the interval list
//! stacked over its tonic or root. Lookups are case-insensitive and accept
//! `-` or spaces in place of `_`.

use super::interval::{iv, Interval};
use crate::error::{GrilleError, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct ScaleQuality {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub intervals: &'static [Interval],
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChordQuality {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub intervals: &'static [Interval],
}

const fn scale(
    name: &'static str,
    aliases: &'static [&'static str],
    intervals: &'static [Interval],
) -> ScaleQuality {
    ScaleQuality {
        name,
        aliases,
        intervals,
    }
}

const fn chord(
    name: &'static str,
    aliases: &'static [&'static str],
    intervals: &'static [Interval],
) -> ChordQuality {
    ChordQuality {
        name,
        aliases,
        intervals,
    }
}

pub static SCALES: &[ScaleQuality] = &[
    scale(
        "major",
        &["maj", "ionian"],
        &[iv(1, 0), iv(2, 0), iv(3, 0), iv(4, 0), iv(5, 0), iv(6, 0), iv(7, 0)],
    ),
    scale(
        "minor",
        &["min", "aeolian", "natural_minor"],
        &[iv(1, 0), iv(2, 0), iv(3, -1), iv(4, 0), iv(5, 0), iv(6, -1), iv(7, -1)],
    ),
    scale(
        "harmonic_minor",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, -1), iv(4, 0), iv(5, 0), iv(6, -1), iv(7, 0)],
    ),
    scale(
        "melodic_minor",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, -1), iv(4, 0), iv(5, 0), iv(6, 0), iv(7, 0)],
    ),
    scale(
        "dorian",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, -1), iv(4, 0), iv(5, 0), iv(6, 0), iv(7, -1)],
    ),
    scale(
        "phrygian",
        &[],
        &[iv(1, 0), iv(2, -1), iv(3, -1), iv(4, 0), iv(5, 0), iv(6, -1), iv(7, -1)],
    ),
    scale(
        "lydian",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, 0), iv(4, 1), iv(5, 0), iv(6, 0), iv(7, 0)],
    ),
    scale(
        "mixolydian",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, 0), iv(4, 0), iv(5, 0), iv(6, 0), iv(7, -1)],
    ),
    scale(
        "locrian",
        &[],
        &[iv(1, 0), iv(2, -1), iv(3, -1), iv(4, 0), iv(5, -1), iv(6, -1), iv(7, -1)],
    ),
    scale(
        "major_pentatonic",
        &["pentatonic"],
        &[iv(1, 0), iv(2, 0), iv(3, 0), iv(5, 0), iv(6, 0)],
    ),
    scale(
        "minor_pentatonic",
        &[],
        &[iv(1, 0), iv(3, -1), iv(4, 0), iv(5, 0), iv(7, -1)],
    ),
    scale(
        "blues",
        &[],
        &[iv(1, 0), iv(3, -1), iv(4, 0), iv(4, 1), iv(5, 0), iv(7, -1)],
    ),
    scale(
        "whole_tone",
        &[],
        &[iv(1, 0), iv(2, 0), iv(3, 0), iv(4, 1), iv(5, 1), iv(7, -1)],
    ),
    scale(
        "chromatic",
        &[],
        &[
            iv(1, 0),
            iv(1, 1),
            iv(2, 0),
            iv(2, 1),
            iv(3, 0),
            iv(4, 0),
            iv(4, 1),
            iv(5, 0),
            iv(5, 1),
            iv(6, 0),
            iv(6, 1),
            iv(7, 0),
        ],
    ),
];

pub static CHORDS: &[ChordQuality] = &[
    chord("maj", &["", "M", "major"], &[iv(1, 0), iv(3, 0), iv(5, 0)]),
    chord("min", &["m", "-", "minor"], &[iv(1, 0), iv(3, -1), iv(5, 0)]),
    chord("dim", &["o"], &[iv(1, 0), iv(3, -1), iv(5, -1)]),
    chord("aug", &["+"], &[iv(1, 0), iv(3, 0), iv(5, 1)]),
    chord("sus2", &[], &[iv(1, 0), iv(2, 0), iv(5, 0)]),
    chord("sus4", &["sus"], &[iv(1, 0), iv(4, 0), iv(5, 0)]),
    chord("5", &["power"], &[iv(1, 0), iv(5, 0)]),
    chord("6", &["maj6"], &[iv(1, 0), iv(3, 0), iv(5, 0), iv(6, 0)]),
    chord("min6", &["m6"], &[iv(1, 0), iv(3, -1), iv(5, 0), iv(6, 0)]),
    chord("7", &["dom7"], &[iv(1, 0), iv(3, 0), iv(5, 0), iv(7, -1)]),
    chord("maj7", &["M7"], &[iv(1, 0), iv(3, 0), iv(5, 0), iv(7, 0)]),
    chord("min7", &["m7", "-7"], &[iv(1, 0), iv(3, -1), iv(5, 0), iv(7, -1)]),
    chord(
        "min7b5",
        &["m7b5", "half_dim"],
        &[iv(1, 0), iv(3, -1), iv(5, -1), iv(7, -1)],
    ),
    chord("dim7", &["o7"], &[iv(1, 0), iv(3, -1), iv(5, -1), iv(7, -2)]),
    chord(
        "minmaj7",
        &["mmaj7"],
        &[iv(1, 0), iv(3, -1), iv(5, 0), iv(7, 0)],
    ),
    chord("augmaj7", &["+maj7"], &[iv(1, 0), iv(3, 0), iv(5, 1), iv(7, 0)]),
    chord("aug7", &["+7"], &[iv(1, 0), iv(3, 0), iv(5, 1), iv(7, -1)]),
    chord("7sus4", &[], &[iv(1, 0), iv(4, 0), iv(5, 0), iv(7, -1)]),
    chord("9", &["dom9"], &[iv(1, 0), iv(3, 0), iv(5, 0), iv(7, -1), iv(9, 0)]),
    chord("maj9", &["M9"], &[iv(1, 0), iv(3, 0), iv(5, 0), iv(7, 0), iv(9, 0)]),
    chord(
        "min9",
        &["m9"],
        &[iv(1, 0), iv(3, -1), iv(5, 0), iv(7, -1), iv(9, 0)],
    ),
];

fn normalize(name: &str) -> String {
    name.trim().replace(['-', ' '], "_")
}

/// Case-insensitive lookup, but the single-letter `M`/`m` aliases are kept
/// case-sensitive so `M7` and `m7` stay different chords.
fn matches(candidate: &str, wanted: &str) -> bool {
    if candidate.starts_with(['M', 'm']) && candidate.len() <= 2 {
        return candidate == wanted;
    }
    candidate.eq_ignore_ascii_case(wanted)
        || normalize(candidate).eq_ignore_ascii_case(&normalize(wanted))
}

impl ScaleQuality {
    pub fn lookup(name: &str) -> Result<&'static ScaleQuality> {
        SCALES
            .iter()
            .find(|q| matches(q.name, name) || q.aliases.iter().any(|a| matches(a, name)))
            .ok_or_else(|| GrilleError::UnknownQuality {
                kind: "scale",
                name: name.to_string(),
            })
    }
}

impl ChordQuality {
    pub fn lookup(name: &str) -> Result<&'static ChordQuality> {
        let wanted = name.trim();
        CHORDS
            .iter()
            .find(|q| q.name == wanted || q.aliases.contains(&wanted))
            .or_else(|| {
                CHORDS.iter().find(|q| {
                    matches(q.name, wanted) || q.aliases.iter().any(|a| matches(a, wanted))
                })
            })
            .ok_or_else(|| GrilleError::UnknownQuality {
                kind: "chord",
                name: name.to_string(),
            })
    }

    /// The quality whose interval list is exactly `intervals`.
    pub fn classify(intervals: &[Interval]) -> Result<&'static ChordQuality> {
        CHORDS
            .iter()
            .find(|q| q.intervals == intervals)
            .ok_or_else(|| GrilleError::UnknownQuality {
                kind: "chord",
                name: intervals
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_lookup_accepts_aliases() {
        assert_eq!(ScaleQuality::lookup("major").unwrap().name, "major");
        assert_eq!(ScaleQuality::lookup("Ionian").unwrap().name, "major");
        assert_eq!(ScaleQuality::lookup("harmonic-minor").unwrap().name, "harmonic_minor");
        assert_eq!(ScaleQuality::lookup("whole tone").unwrap().name, "whole_tone");
        assert!(matches!(
            ScaleQuality::lookup("klingon"),
            Err(GrilleError::UnknownQuality { kind: "scale", .. })
        ));
    }

    #[test]
    fn chord_lookup_keeps_m_and_capital_m_apart() {
        assert_eq!(ChordQuality::lookup("m7").unwrap().name, "min7");
        assert_eq!(ChordQuality::lookup("M7").unwrap().name, "maj7");
        assert_eq!(ChordQuality::lookup("").unwrap().name, "maj");
        assert_eq!(ChordQuality::lookup("MAJ7").unwrap().name, "maj7");
        assert_eq!(ChordQuality::lookup("half-dim").unwrap().name, "min7b5");
        assert!(ChordQuality::lookup("13b9#11").is_err());
    }

    #[test]
    fn tables_are_well_formed() {
        for q in SCALES {
            assert_eq!(q.intervals[0], Interval::UNISON, "{}", q.name);
            assert!(q
                .intervals
                .windows(2)
                .all(|w| w[0].semitones() < w[1].semitones()));
        }
        for q in CHORDS {
            assert_eq!(q.intervals[0], Interval::UNISON, "{}", q.name);
            assert_eq!(ChordQuality::classify(q.intervals).unwrap().name, q.name);
        }
    }
}
