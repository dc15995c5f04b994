use std::collections::VecDeque;

use tracing::debug;

use super::drums::DRUM_CHANNEL;
use crate::engine::{Event, Meta, NoteEvent, Player, PlayerContext};
use crate::error::Result;
use crate::sequencing::{Duration, TimeSteps};

/// GM high wood block, struck on downbeats.
pub const ACCENT_KEY: u8 = 76;
/// GM low wood block, struck on the other beats.
pub const CLICK_KEY: u8 = 77;

/// A free-running metronome.
///
/// It clicks every beat from its first setup and keeps going across chord
/// changes, restarting only when the time signature changes. Each chord
/// change is marked with a [`Meta::Marker`] naming the new chord.
#[derive(Debug, Clone)]
pub struct PulsePlayer {
    name: String,
    channel: u8,
    velocity: u8,
    steps: Option<TimeSteps>,
    origin: Duration,
    /// Cursor of the last item handed out
    last: Duration,
    /// Chord changes not yet marked, oldest first
    markers: VecDeque<String>,
}

impl PulsePlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: DRUM_CHANNEL,
            velocity: 90,
            steps: None,
            origin: Duration::ZERO,
            last: Duration::ZERO,
            markers: VecDeque::new(),
        }
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Player for PulsePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &PlayerContext) -> Result<()> {
        debug!(player = %self.name, time_signature = %ctx.time_signature, "pulse restart");
        self.steps = Some(
            TimeSteps::new(ctx.time_signature, ctx.time_signature.beat_duration())?
                .from_section(ctx.section),
        );
        self.origin = ctx.start;
        self.last = ctx.start;
        self.markers.push_back(ctx.chord.symbol());
        Ok(())
    }

    fn on_context(&mut self, ctx: &PlayerContext) -> Result<()> {
        self.markers.push_back(ctx.chord.symbol());
        Ok(())
    }

    /// Markers go out no earlier than the click already handed out, so the
    /// stream never runs backwards. A segment shorter than the carried click
    /// gets its marker with the next one.
    fn next(&mut self) -> Option<(Duration, Event)> {
        if let Some(symbol) = self.markers.pop_front() {
            return Some((self.last, Meta::Marker(symbol).into()));
        }
        let step = self.steps.as_mut()?.next()?;
        let at = self.origin + step.elapsed;
        let (key, velocity) = if step.section.is_downbeat() {
            (ACCENT_KEY, self.velocity.saturating_add(30).min(127))
        } else {
            (CLICK_KEY, self.velocity)
        };
        self.last = at;
        let note = NoteEvent {
            key,
            velocity,
            channel: self.channel,
            duration: Duration::SIXTEENTH.min(step.length),
        };
        Some((at, note.into()))
    }

    fn is_time_signature_bound(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{Scheduler, Source};
    use crate::grid::{GridBuilder, HarmonyFields, Progression};

    fn scheduler(text: &str) -> Scheduler {
        let fields: Vec<HarmonyFields> = text.split(';').map(|t| t.parse().unwrap()).collect();
        let grid = GridBuilder::new(&Config::default()).unwrap().build(&fields).unwrap();
        Scheduler::new(Progression::new(grid).unwrap()).with_player(PulsePlayer::new("click"))
    }

    fn stream(scheduler: Scheduler) -> Vec<String> {
        scheduler
            .map(|item| item.unwrap())
            .filter(|s| matches!(s.source, Source::Player(_)))
            .map(|s| match s.event {
                Event::Note(note) => format!("{}:{}", s.cursor, note.key),
                Event::Meta(meta) => format!("{}:{}", s.cursor, meta),
                other => unreachable!("{other:?}"),
            })
            .collect()
    }

    // the click carried over a chord change is replayed before the marker
    #[test]
    fn clicks_through_chord_changes() {
        let items = stream(scheduler("p=I:d=H,V:d=W,I:d=H"));
        assert_eq!(
            items,
            [
                "0:marker C_maj7",
                "0:76",
                "1:77",
                "2:77",
                "2:marker G_7",
                "3:77",
                "4:76",
                "5:77",
                "6:77",
                "6:marker C_maj7",
                "7:77",
            ]
        );
    }

    #[test]
    fn marks_chords_shorter_than_a_beat() {
        let markers: Vec<String> = stream(scheduler("p=I:d=9/4,V:d=E,I:d=W"))
            .into_iter()
            .filter(|item| item.contains("marker"))
            .collect();
        assert_eq!(markers, ["0:marker C_maj7", "3:marker G_7", "3:marker C_maj7"]);
    }

    #[test]
    fn restarts_on_time_signature_change() {
        let items = stream(scheduler("p=I;ts=3/4 p=V"));
        assert_eq!(
            items,
            [
                "0:marker C_maj7",
                "0:76",
                "1:77",
                "2:77",
                "3:77",
                "4:marker G_7",
                "4:76",
                "5:77",
                "6:77",
            ]
        );
    }
}
