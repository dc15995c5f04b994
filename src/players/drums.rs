use crate::engine::{Event, NoteEvent, Player, PlayerContext};
use crate::error::Result;
use crate::sequencing::{Duration, Hit, Pattern};

/// General MIDI percussion channel (0-based).
pub const DRUM_CHANNEL: u8 = 9;

/// Plays a rhythm pattern once per bar, aligned to the barlines.
///
/// A segment that starts mid-bar joins the pattern at that point; hits
/// that would ring past the segment end are cut short.
#[derive(Debug, Clone)]
pub struct DrumPlayer {
    name: String,
    pattern: Pattern,
    channel: u8,
    hits: Vec<Hit>,
    bar: Duration,
    bar_start: Duration,
    index: usize,
    start: Duration,
    end: Duration,
}

impl DrumPlayer {
    pub fn new(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            channel: DRUM_CHANNEL,
            hits: Vec::new(),
            bar: Duration::WHOLE,
            bar_start: Duration::ZERO,
            index: 0,
            start: Duration::ZERO,
            end: Duration::ZERO,
        }
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }
}

impl Player for DrumPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &PlayerContext) -> Result<()> {
        self.bar = ctx.time_signature.bar_duration();
        self.hits = self.pattern.hits(self.bar)?;
        let phase = ctx.section.to_duration(&ctx.time_signature) % self.bar;
        self.bar_start = ctx.start - phase;
        self.index = 0;
        self.start = ctx.start;
        self.end = ctx.end;
        Ok(())
    }

    fn next(&mut self) -> Option<(Duration, Event)> {
        if self.hits.is_empty() {
            return None;
        }
        loop {
            if self.index == self.hits.len() {
                self.index = 0;
                self.bar_start += self.bar;
            }
            let hit = self.hits[self.index];
            let at = self.bar_start + hit.offset;
            if at >= self.end {
                return None;
            }
            self.index += 1;
            if at < self.start {
                continue;
            }
            let note = NoteEvent {
                key: hit.key,
                velocity: hit.velocity,
                channel: self.channel,
                duration: hit.length.min(self.end - at),
            };
            return Some((at, note.into()));
        }
    }
}
