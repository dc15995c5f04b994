use serde::{Deserialize, Serialize};

use crate::engine::{Event, NoteEvent, Player, PlayerContext};
use crate::error::Result;
use crate::sequencing::{Duration, TimeSteps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Up,
    Down,
    #[serde(alias = "up-down", alias = "updown")]
    UpDown,
}

impl Direction {
    /// Indices into a chord of `len` notes for one full cycle.
    fn order(self, len: usize) -> Vec<usize> {
        match self {
            Direction::Up => (0..len).collect(),
            Direction::Down => (0..len).rev().collect(),
            Direction::UpDown if len < 3 => (0..len).collect(),
            Direction::UpDown => (0..len).chain((1..len - 1).rev()).collect(),
        }
    }
}

/// Walks the voiced chord one note per step.
///
/// The walk position survives chord changes: a new chord picks up where
/// the last one left off instead of starting from its lowest note.
#[derive(Debug, Clone)]
pub struct ArpeggioPlayer {
    name: String,
    direction: Direction,
    step: Duration,
    octave: u8,
    velocity: u8,
    channel: u8,
    keys: Vec<u8>,
    order: Vec<usize>,
    position: usize,
    steps: Option<TimeSteps>,
    start: Duration,
}

impl ArpeggioPlayer {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            step: Duration::EIGHTH,
            octave: 4,
            velocity: 100,
            channel: 0,
            keys: Vec::new(),
            order: Vec::new(),
            position: 0,
            steps: None,
            start: Duration::ZERO,
        }
    }

    pub fn step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn octave(mut self, octave: u8) -> Self {
        self.octave = octave;
        self
    }

    pub fn velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }
}

impl Player for ArpeggioPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &PlayerContext) -> Result<()> {
        self.keys = ctx.chord.midi_notes(self.octave)?;
        self.order = self.direction.order(self.keys.len());
        self.steps = Some(
            TimeSteps::new(ctx.time_signature, self.step)?
                .from_section(ctx.section)
                .limit(ctx.span()),
        );
        self.start = ctx.start;
        Ok(())
    }

    fn next(&mut self) -> Option<(Duration, Event)> {
        if self.order.is_empty() {
            return None;
        }
        let step = self.steps.as_mut()?.next()?;
        let index = self.order[self.position % self.order.len()];
        self.position = (self.position + 1) % self.order.len();
        let note = NoteEvent {
            key: self.keys[index],
            velocity: self.velocity,
            channel: self.channel,
            duration: step.length,
        };
        Some((self.start + step.elapsed, note.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use crate::sequencing::{Tempo, TimeSection, TimeSignature};
    use crate::theory::{Chord, Scale};

    fn context(chord: &str, start: i64) -> PlayerContext {
        PlayerContext {
            scale: "C_major".parse::<Scale>().unwrap(),
            chord: chord.parse::<Chord>().unwrap(),
            time_signature: TimeSignature::FOUR_FOUR,
            tempo: Tempo::DEFAULT,
            start: Duration::from_quarters(start),
            end: Duration::from_quarters(start + 1),
            section: TimeSection::START,
            position: Position::default(),
        }
    }

    fn keys(player: &mut ArpeggioPlayer) -> Vec<u8> {
        std::iter::from_fn(|| player.next())
            .filter_map(|(_, event)| match event {
                Event::Note(note) => Some(note.key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn orders() {
        assert_eq!(Direction::Up.order(3), [0, 1, 2]);
        assert_eq!(Direction::Down.order(3), [2, 1, 0]);
        assert_eq!(Direction::UpDown.order(4), [0, 1, 2, 3, 2, 1]);
        assert_eq!(Direction::UpDown.order(2), [0, 1]);
    }

    #[test]
    fn walks_one_note_per_step() {
        let mut player = ArpeggioPlayer::new("arp", Direction::Up).step(Duration::SIXTEENTH);
        player.setup(&context("C", 0)).unwrap();
        assert_eq!(keys(&mut player), [60, 64, 67, 60]);
    }

    #[test]
    fn keeps_position_across_chords() {
        let mut player = ArpeggioPlayer::new("arp", Direction::UpDown).step(Duration::EIGHTH);
        player.setup(&context("C", 0)).unwrap();
        assert_eq!(keys(&mut player), [60, 64]);

        // the walk continues on the third step of the cycle
        player.setup(&context("F", 1)).unwrap();
        assert_eq!(keys(&mut player), [72, 69]);
    }
}
