use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::grid::Position;
use crate::sequencing::{Duration, Tempo, TimeSection, TimeSignature};
use crate::theory::{Chord, Scale};

/// Everything a player learns about the segment it is asked to fill.
///
/// Cursors are absolute: `start` and `end` count from the beginning of
/// playback, across repeats. `section` is where `start` falls inside the
/// current harmony item's bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerContext {
    pub scale: Scale,
    pub chord: Chord,
    pub time_signature: TimeSignature,
    pub tempo: Tempo,
    pub start: Duration,
    pub end: Duration,
    pub section: TimeSection,
    pub position: Position,
}

impl PlayerContext {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, cursor: Duration) -> bool {
        self.start <= cursor && cursor < self.end
    }
}

/// A note to strike. The duration is musical; the emitter turns it into a
/// note-off at the tempo in force when the note starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub key: u8,
    pub velocity: u8,
    pub channel: u8,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Meta {
    Tempo(Tempo),
    TimeSignature(TimeSignature),
    /// Symbol of the chord taking over
    Chord(String),
    Marker(String),
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meta::Tempo(tempo) => write!(f, "tempo {tempo}"),
            Meta::TimeSignature(ts) => write!(f, "time signature {ts}"),
            Meta::Chord(symbol) => write!(f, "chord {symbol}"),
            Meta::Marker(text) => write!(f, "marker {text}"),
        }
    }
}

/// Code run when the event is emitted.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Note(NoteEvent),
    Meta(Meta),
    /// Instrument selection for a channel
    Program { channel: u8, program: u8 },
    Callback(Callback),
}

impl From<NoteEvent> for Event {
    fn from(note: NoteEvent) -> Self {
        Event::Note(note)
    }
}

impl From<Meta> for Event {
    fn from(meta: Meta) -> Self {
        Event::Meta(meta)
    }
}

/// Instrument logic: a lazy stream of timed events per segment.
///
/// A time-signature-bound player is set up afresh for every segment and
/// must not yield a cursor at or past `ctx.end`; `None` means it is done
/// with the segment. A free player is set up once per time signature and
/// runs on across segments; whatever it yields past the segment end is held
/// back by the scheduler and replayed in the next segment.
pub trait Player: Send {
    fn name(&self) -> &str;

    /// Start a fresh stream for `ctx`.
    fn setup(&mut self, ctx: &PlayerContext) -> Result<()>;

    /// A new segment began without a restart (free players only).
    fn on_context(&mut self, _ctx: &PlayerContext) -> Result<()> {
        Ok(())
    }

    /// Next `(cursor, event)`, cursors never decreasing.
    fn next(&mut self) -> Option<(Duration, Event)>;

    fn is_time_signature_bound(&self) -> bool {
        true
    }
}

/// A player that replays a fixed list of events, offset from each
/// segment's start. Handy for tests and for scripted cues.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    name: String,
    script: Vec<(Duration, Event)>,
    bound: bool,
    queue: std::collections::VecDeque<(Duration, Event)>,
}

impl ScriptedPlayer {
    pub fn new(name: impl Into<String>, script: Vec<(Duration, Event)>) -> Self {
        Self {
            name: name.into(),
            script,
            bound: true,
            queue: Default::default(),
        }
    }

    /// Play the script once from the first segment, ignoring segment ends.
    pub fn free(mut self) -> Self {
        self.bound = false;
        self
    }
}

impl Player for ScriptedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &PlayerContext) -> Result<()> {
        let bound = self.bound;
        self.queue = self
            .script
            .iter()
            .filter(|(offset, _)| !bound || ctx.start + *offset < ctx.end)
            .map(|(offset, event)| (ctx.start + *offset, event.clone()))
            .collect();
        Ok(())
    }

    fn next(&mut self) -> Option<(Duration, Event)> {
        self.queue.pop_front()
    }

    fn is_time_signature_bound(&self) -> bool {
        self.bound
    }
}
