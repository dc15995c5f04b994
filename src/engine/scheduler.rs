//! K-way merge of player streams over a progression.
//!
//! The scheduler walks the progression one chord (segment) at a time. At
//! each segment it hands every track a context, then repeatedly emits the
//! track whose pending item has the smallest cursor. Ties go to the track
//! registered first. A segment ends when no track has anything left before
//! the segment end; the progression then advances.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use super::player::{Event, Meta, Player, PlayerContext};
use super::track::Track;
use crate::error::Result;
use crate::grid::{Position, Progression};
use crate::sequencing::{Duration, Tempo, TimeSection};

/// Who produced a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Chord, tempo and meter announcements at segment starts
    Progression,
    /// Index of the player in registration order
    Player(usize),
}

#[derive(Debug, Clone)]
pub struct Scheduled {
    pub cursor: Duration,
    pub source: Source,
    pub event: Event,
    /// Tempo of the segment the event is emitted in
    pub tempo: Tempo,
    pub position: Position,
}

pub struct Scheduler {
    progression: Progression,
    tracks: Vec<Track>,
    repeat: bool,
    /// Absolute start of the current segment
    start: Duration,
    /// Absolute end of the current segment
    end: Duration,
    context: Option<PlayerContext>,
    announcements: VecDeque<Scheduled>,
    last_cursor: Duration,
    finished: bool,
}

impl Scheduler {
    pub fn new(progression: Progression) -> Self {
        Self {
            progression,
            tracks: Vec::new(),
            repeat: false,
            start: Duration::ZERO,
            end: Duration::ZERO,
            context: None,
            announcements: VecDeque::new(),
            last_cursor: Duration::ZERO,
            finished: false,
        }
    }

    /// Register a player. Registration order breaks cursor ties.
    pub fn add_player(&mut self, player: Box<dyn Player>) -> usize {
        debug!(player = player.name(), index = self.tracks.len(), "player registered");
        self.tracks.push(Track::new(player));
        self.tracks.len() - 1
    }

    pub fn with_player(mut self, player: impl Player + 'static) -> Self {
        self.add_player(Box::new(player));
        self
    }

    /// Keep cycling through the progression instead of stopping at the end.
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Structural edits between rounds. They take effect from the next
    /// segment; the one being merged keeps its context.
    pub fn progression_mut(&mut self) -> &mut Progression {
        &mut self.progression
    }

    pub fn player_name(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(Track::name)
    }

    pub fn player_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn context(&self) -> Option<&PlayerContext> {
        self.context.as_ref()
    }

    /// Build the context for the segment under the progression cursor and
    /// hand it to every track.
    fn enter_segment(&mut self) -> Result<()> {
        let harmony = self.progression.harmony();
        let chord = self.progression.chord();
        let time_signature = harmony.time_signature();
        let tempo = harmony.tempo();
        let position = self.progression.position();

        let ctx = PlayerContext {
            scale: harmony.scale().clone(),
            chord: chord.chord().clone(),
            time_signature,
            tempo,
            start: self.start,
            end: self.start + chord.duration(),
            section: TimeSection::from_duration(&time_signature, chord.offset())?,
            position,
        };
        debug!(
            %position,
            chord = %ctx.chord.symbol(),
            start = %ctx.start,
            end = %ctx.end,
            section = %ctx.section,
            "segment"
        );

        let previous = self.context.as_ref();
        let announce = |event: Meta| Scheduled {
            cursor: ctx.start,
            source: Source::Progression,
            event: Event::Meta(event),
            tempo,
            position,
        };
        if previous.map_or(true, |p| p.tempo != tempo) {
            self.announcements.push_back(announce(Meta::Tempo(tempo)));
        }
        if previous.map_or(true, |p| p.time_signature != time_signature) {
            self.announcements
                .push_back(announce(Meta::TimeSignature(time_signature)));
        }
        self.announcements
            .push_back(announce(Meta::Chord(ctx.chord.symbol())));

        for track in &mut self.tracks {
            track.begin(&ctx)?;
        }
        self.end = ctx.end;
        self.context = Some(ctx);
        Ok(())
    }

    /// Index of the track with the smallest pending cursor; the earliest
    /// registered wins ties.
    fn pick(&self) -> Option<usize> {
        let mut best: Option<(usize, Duration)> = None;
        for (index, track) in self.tracks.iter().enumerate() {
            if let Some(cursor) = track.pending_cursor() {
                if best.map_or(true, |(_, c)| cursor < c) {
                    best = Some((index, cursor));
                }
            }
        }
        best.map(|(index, _)| index)
    }

    fn step(&mut self) -> Result<Option<Scheduled>> {
        if self.context.is_none() {
            self.enter_segment()?;
        }
        loop {
            if let Some(item) = self.announcements.pop_front() {
                return Ok(Some(item));
            }

            if let Some(index) = self.pick() {
                let end = self.end;
                let Some((cursor, event)) = self.tracks[index].take(end) else {
                    continue;
                };
                let cursor = if cursor < self.last_cursor {
                    warn!(player = self.tracks[index].name(), %cursor, "cursor went backwards");
                    self.last_cursor
                } else {
                    cursor
                };
                self.last_cursor = cursor;
                trace!(player = self.tracks[index].name(), %cursor, "merge");

                let (tempo, position) = self
                    .context
                    .as_ref()
                    .map(|ctx| (ctx.tempo, ctx.position))
                    .unwrap_or_default();
                return Ok(Some(Scheduled {
                    cursor,
                    source: Source::Player(index),
                    event,
                    tempo,
                    position,
                }));
            }

            let wrapped = self.progression.advance();
            if wrapped && !self.repeat {
                debug!(end = %self.end, "progression finished");
                return Ok(None);
            }
            self.start = self.end;
            self.enter_segment()?;
        }
    }
}

/// Merged events in cursor order. A player error ends the stream after it
/// is reported.
impl Iterator for Scheduler {
    type Item = Result<Scheduled>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::player::{NoteEvent, ScriptedPlayer};
    use crate::grid::{GridBuilder, HarmonyFields};

    fn progression(text: &str) -> Progression {
        let fields: Vec<HarmonyFields> = text.split(';').map(|t| t.parse().unwrap()).collect();
        let grid = GridBuilder::new(&Config::default()).unwrap().build(&fields).unwrap();
        Progression::new(grid).unwrap()
    }

    fn note(key: u8) -> Event {
        Event::Note(NoteEvent {
            key,
            velocity: 100,
            channel: 0,
            duration: Duration::QUARTER,
        })
    }

    fn script(offsets: &[(&str, u8)]) -> Vec<(Duration, Event)> {
        offsets
            .iter()
            .map(|(at, key)| (Duration::parse(at).unwrap(), note(*key)))
            .collect()
    }

    fn player_items(scheduler: Scheduler) -> Vec<(Duration, usize, u8)> {
        scheduler
            .map(|item| item.unwrap())
            .filter_map(|s| match (s.source, s.event) {
                (Source::Player(i), Event::Note(n)) => Some((s.cursor, i, n.key)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn merges_streams_in_cursor_order() {
        let scheduler = Scheduler::new(progression("p=I"))
            .with_player(ScriptedPlayer::new("a", script(&[("0", 1), ("3/2", 2), ("3", 3)])))
            .with_player(ScriptedPlayer::new("b", script(&[("1/2", 10), ("1", 11), ("7/2", 12)])))
            .with_player(ScriptedPlayer::new("c", script(&[("1/3", 20), ("2/3", 21), ("5/3", 22)])));

        let items = player_items(scheduler);
        let keys: Vec<u8> = items.iter().map(|i| i.2).collect();
        assert_eq!(keys, [1, 20, 10, 21, 11, 2, 22, 3, 12]);
        assert!(items.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn ties_go_to_registration_order() {
        let scheduler = Scheduler::new(progression("p=I"))
            .with_player(ScriptedPlayer::new("first", script(&[("0", 1), ("1", 2)])))
            .with_player(ScriptedPlayer::new("second", script(&[("0", 10), ("1", 20)])));

        let sources: Vec<usize> = player_items(scheduler).iter().map(|i| i.1).collect();
        assert_eq!(sources, [0, 1, 0, 1]);
    }

    #[test]
    fn bound_players_restart_every_segment() {
        let scheduler = Scheduler::new(progression("p=I,IV,V"))
            .with_player(ScriptedPlayer::new("a", script(&[("0", 1), ("2", 2)])));

        let cursors: Vec<String> = player_items(scheduler).iter().map(|i| i.0.to_string()).collect();
        assert_eq!(cursors, ["0", "2", "4", "6", "8", "10"]);
    }

    #[test]
    fn bound_players_never_pass_the_segment_end() {
        // both chords last a half, so the script's "3" never fits
        let scheduler = Scheduler::new(progression("p=I:d=H,V"))
            .with_player(ScriptedPlayer::new("a", script(&[("0", 1), ("3", 2)])));

        let cursors: Vec<String> = player_items(scheduler).iter().map(|i| i.0.to_string()).collect();
        assert_eq!(cursors, ["0", "2"]);
    }

    #[test]
    fn free_players_carry_across_segments() {
        // one event every 3 quarters, free running over three 4-quarter bars
        let free = script(&[("0", 1), ("3", 2), ("6", 3), ("9", 4), ("12", 5)]);
        let scheduler = Scheduler::new(progression("p=I,IV,V"))
            .with_player(ScriptedPlayer::new("pulse", free).free());

        let items = player_items(scheduler);
        let keys: Vec<u8> = items.iter().map(|i| i.2).collect();
        // 12 lies past the last segment and is never emitted
        assert_eq!(keys, [1, 2, 3, 4]);
        let cursors: Vec<String> = items.iter().map(|i| i.0.to_string()).collect();
        assert_eq!(cursors, ["0", "3", "6", "9"]);
    }

    #[test]
    fn time_signature_change_restarts_free_players() {
        let free = script(&[("0", 1), ("5", 2)]);
        let scheduler = Scheduler::new(progression("p=I;ts=3/4 p=V"))
            .with_player(ScriptedPlayer::new("pulse", free).free());

        // "5" was carried out of the 4/4 bar, then dropped when 3/4 began;
        // the restarted script plays its "0" at the 3/4 bar start
        let cursors: Vec<String> = player_items(scheduler).iter().map(|i| i.0.to_string()).collect();
        assert_eq!(cursors, ["0", "4"]);
    }

    #[test]
    fn announces_chords_and_tempo_changes() {
        let scheduler = Scheduler::new(progression("p=II,V;bpm=90 p=I"));
        let metas: Vec<String> = scheduler
            .map(|item| item.unwrap())
            .filter_map(|s| match s.event {
                Event::Meta(meta) => Some(format!("{}@{}", meta, s.cursor)),
                _ => None,
            })
            .collect();
        assert_eq!(
            metas,
            [
                "tempo 120 bpm@0",
                "time signature 4/4@0",
                "chord D_min7@0",
                "chord G_7@4",
                "tempo 90 bpm@8",
                "chord C_maj7@8",
            ]
        );
    }

    #[test]
    fn repeat_keeps_cycling() {
        let scheduler = Scheduler::new(progression("p=I,V"))
            .repeat(true)
            .with_player(ScriptedPlayer::new("a", script(&[("0", 1)])));

        let cursors: Vec<String> = player_items_take(scheduler, 5);
        assert_eq!(cursors, ["0", "4", "8", "12", "16"]);
    }

    fn player_items_take(scheduler: Scheduler, n: usize) -> Vec<String> {
        scheduler
            .map(|item| item.unwrap())
            .filter(|s| matches!(s.source, Source::Player(_)))
            .take(n)
            .map(|s| s.cursor.to_string())
            .collect()
    }

    #[test]
    fn removing_the_current_item_still_plays_the_next() {
        let mut scheduler = Scheduler::new(progression("p=I,V;p=IV"))
            .with_player(ScriptedPlayer::new("a", script(&[("0", 1)])));

        let mut chords = Vec::new();
        let mut cursors = Vec::new();
        while let Some(item) = scheduler.next() {
            let item = item.unwrap();
            match item.event {
                Event::Meta(Meta::Chord(symbol)) => {
                    if symbol == "G_7" {
                        scheduler.progression_mut().remove_harmony(0).unwrap();
                    }
                    chords.push(symbol);
                }
                Event::Note(_) => cursors.push(item.cursor.to_string()),
                _ => {}
            }
        }
        assert_eq!(chords, ["C_maj7", "G_7", "F_maj7"]);
        assert_eq!(cursors, ["0", "4", "8"]);
    }

    #[test]
    fn setup_errors_end_the_stream() {
        struct Broken;
        impl Player for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn setup(&mut self, _ctx: &PlayerContext) -> Result<()> {
                Err(crate::error::GrilleError::Player {
                    name: "broken".into(),
                    reason: "no instrument".into(),
                })
            }
            fn next(&mut self) -> Option<(Duration, Event)> {
                None
            }
        }

        let mut scheduler = Scheduler::new(progression("p=I")).with_player(Broken);
        assert!(matches!(scheduler.next(), Some(Err(_))));
        assert!(scheduler.next().is_none());
    }
}
