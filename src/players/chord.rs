use std::collections::VecDeque;

use crate::engine::{Event, NoteEvent, Player, PlayerContext};
use crate::error::Result;
use crate::sequencing::{Duration, TimeSteps};

/// Strikes the whole voiced chord every `step`.
///
/// Without a step the chord is struck once per bar. The last strike of a
/// segment is shortened so it ends with the segment.
#[derive(Debug, Clone)]
pub struct ChordPlayer {
    name: String,
    step: Option<Duration>,
    octave: u8,
    velocity: u8,
    channel: u8,
    /// Sent once, ahead of the first strike
    program: Option<u8>,
    program_sent: bool,
    keys: Vec<u8>,
    steps: Option<TimeSteps>,
    start: Duration,
    strike: VecDeque<(Duration, Event)>,
}

impl ChordPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: None,
            octave: 4,
            velocity: 100,
            channel: 0,
            program: None,
            program_sent: false,
            keys: Vec::new(),
            steps: None,
            start: Duration::ZERO,
            strike: VecDeque::new(),
        }
    }

    pub fn step(mut self, step: Duration) -> Self {
        self.step = Some(step);
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

    pub fn program(mut self, program: u8) -> Self {
        self.program = Some(program);
        self
    }
}

impl Player for ChordPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &PlayerContext) -> Result<()> {
        let step = self
            .step
            .unwrap_or_else(|| ctx.time_signature.bar_duration());
        self.keys = ctx.chord.midi_notes(self.octave)?;
        self.steps = Some(
            TimeSteps::new(ctx.time_signature, step)?
                .from_section(ctx.section)
                .limit(ctx.span()),
        );
        self.start = ctx.start;
        self.strike.clear();
        if let (Some(program), false) = (self.program, self.program_sent) {
            let event = Event::Program {
                channel: self.channel,
                program,
            };
            self.strike.push_back((ctx.start, event));
            self.program_sent = true;
        }
        Ok(())
    }

    fn next(&mut self) -> Option<(Duration, Event)> {
        if self.strike.is_empty() {
            let step = self.steps.as_mut()?.next()?;
            let at = self.start + step.elapsed;
            self.strike.extend(self.keys.iter().map(|&key| {
                let note = NoteEvent {
                    key,
                    velocity: self.velocity,
                    channel: self.channel,
                    duration: step.length,
                };
                (at, Event::from(note))
            }));
        }
        self.strike.pop_front()
    }
}
