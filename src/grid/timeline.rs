//! Placing chords in time.
//!
//! A chord with no written duration lasts until the next barline. Barlines
//! are counted from the start of the harmony item, so every item begins on
//! a fresh bar of its own time signature, and chords inside one item share
//! its running cursor.

use super::harmony::{ChordItem, Grid, HarmonyItem};
use super::progression::Position;
use crate::error::Result;
use crate::sequencing::{Duration, Tempo, TimeSection, TimeSignature};

impl HarmonyItem {
    /// Recompute every chord's offset and resolved duration.
    pub(super) fn resolve_durations(&mut self) {
        let time_signature = self.time_signature();
        let mut cursor = Duration::ZERO;
        for item in self.chords_mut() {
            let duration = item
                .declared()
                .unwrap_or_else(|| time_signature.fill_to_bar(cursor));
            item.place(cursor, duration);
            cursor += duration;
        }
    }
}

/// A chord placed on the grid's timeline.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub position: Position,
    pub harmony: &'a HarmonyItem,
    pub chord: &'a ChordItem,
    /// Offset from the start of the grid
    pub start: Duration,
}

impl Segment<'_> {
    pub fn end(&self) -> Duration {
        self.start + self.chord.duration()
    }

    pub fn duration(&self) -> Duration {
        self.chord.duration()
    }

    pub fn tempo(&self) -> Tempo {
        self.harmony.tempo()
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.harmony.time_signature()
    }

    /// Bar/beat of the chord's first beat within its harmony item.
    pub fn section(&self) -> Result<TimeSection> {
        TimeSection::from_duration(&self.harmony.time_signature(), self.chord.offset())
    }
}

impl Grid {
    /// Every chord in play order with its absolute start.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> + '_ {
        let mut start = Duration::ZERO;
        self.items().iter().enumerate().flat_map(move |(h, harmony)| {
            let base = start;
            start += harmony.duration();
            harmony
                .chords()
                .iter()
                .enumerate()
                .map(move |(c, chord)| Segment {
                    position: Position::new(h, c),
                    harmony,
                    chord,
                    start: base + chord.offset(),
                })
        })
    }

    /// Length of one pass through the grid.
    pub fn length(&self) -> Duration {
        self.items().iter().map(HarmonyItem::duration).sum()
    }

    /// Absolute start of the chord at `position`.
    pub fn start_of(&self, position: Position) -> Option<Duration> {
        self.segments()
            .find(|segment| segment.position == position)
            .map(|segment| segment.start)
    }

    /// The chord sounding at `offset`, if it falls inside one pass.
    pub fn locate(&self, offset: Duration) -> Option<Segment<'_>> {
        self.segments()
            .find(|segment| segment.start <= offset && offset < segment.end())
    }

    /// Seconds taken by one pass, honoring each item's tempo.
    pub fn seconds(&self) -> f64 {
        self.items()
            .iter()
            .map(|item| item.tempo().seconds(item.duration()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{Chord, Scale};
    use approx::assert_relative_eq;

    fn chord(text: &str) -> Chord {
        text.parse().unwrap()
    }

    fn item(ts: TimeSignature, chords: &[(&str, Option<&str>)]) -> HarmonyItem {
        let chords = chords
            .iter()
            .map(|(c, d)| ChordItem::new(chord(c), d.map(|d| Duration::parse(d).unwrap())).unwrap())
            .collect();
        HarmonyItem::new("C_major".parse::<Scale>().unwrap(), Tempo::DEFAULT, ts, chords).unwrap()
    }

    #[test]
    fn omitted_durations_fill_to_the_bar() {
        let h = item(
            TimeSignature::FOUR_FOUR,
            &[("C", None), ("F", Some("H")), ("G", None), ("C", Some("3Q")), ("G", None)],
        );
        let durations: Vec<String> = h.chords().iter().map(|c| c.duration().to_string()).collect();
        // 4 | 2 + 2 | 3 + 1
        assert_eq!(durations, ["4", "2", "2", "3", "1"]);
        assert_eq!(h.duration(), Duration::from_quarters(12));
        assert_eq!(h.chords()[4].offset(), Duration::from_quarters(11));
    }

    #[test]
    fn fill_follows_the_time_signature() {
        let waltz = item(TimeSignature::THREE_FOUR, &[("C", Some("1/3Q")), ("G", None)]);
        assert_eq!(waltz.chords()[1].duration(), Duration::parse("8/3").unwrap());
        assert_eq!(waltz.duration(), Duration::DOTTED_HALF);
    }

    #[test]
    fn each_harmony_item_starts_a_fresh_bar() {
        let grid = Grid::new(vec![
            item(TimeSignature::FOUR_FOUR, &[("C", Some("E"))]),
            item(TimeSignature::FOUR_FOUR, &[("F", None)]),
            item(TimeSignature::THREE_FOUR, &[("G", None), ("C", None)]),
        ])
        .unwrap();

        let spans: Vec<(String, String)> = grid
            .segments()
            .map(|s| (s.start.to_string(), s.duration().to_string()))
            .collect();
        assert_eq!(
            spans,
            [
                ("0".into(), "1/2".into()),
                ("1/2".into(), "4".into()),
                ("9/2".into(), "3".into()),
                ("15/2".into(), "3".into()),
            ]
        );
        assert_eq!(grid.length(), Duration::parse("21/2").unwrap());
        assert_eq!(grid.start_of(Position::new(2, 1)), Some(Duration::parse("15/2").unwrap()));
        assert_eq!(grid.locate(Duration::from_quarters(8)).unwrap().position, Position::new(2, 1));
        assert!(grid.locate(grid.length()).is_none());
    }

    #[test]
    fn sections_are_local_to_the_item() {
        let h = item(TimeSignature::FOUR_FOUR, &[("C", Some("6")), ("G", None)]);
        let grid = Grid::new(vec![h]).unwrap();
        let second = grid.segments().nth(1).unwrap();
        let section = second.section().unwrap();
        assert_eq!((section.bar(), section.beat()), (1, 2));
        assert_eq!(second.duration(), Duration::HALF);
    }

    #[test]
    fn seconds_follow_each_tempo() {
        let grid = Grid::new(vec![item(TimeSignature::FOUR_FOUR, &[("C", None)])]).unwrap();
        // one 4/4 bar at 120 bpm
        assert_relative_eq!(grid.seconds(), 2.0);
    }
}
