//! Emitter - turns merged events into timed output
//!
//! Each note becomes a note-on now and a note-off later. Pending offs are
//! kept by musical off time so they interleave with later note-ons; an off
//! due at the same cursor as a new event goes out first. Wall-clock seconds
//! are integrated piecewise: a new tempo applies from the cursor where it
//! first appears, never to time already emitted.

use std::collections::BTreeMap;

use tracing::trace;

use super::converter::note_to_midi;
use super::midi::MidiEvent;
use crate::engine::{Event, Meta, Scheduled};
use crate::sequencing::{Duration, Tempo};

#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Midi(MidiEvent),
    Meta(Meta),
}

/// One output event with its timing in every unit a transport may want.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    /// Wall-clock seconds since the start of playback
    pub seconds: f64,
    pub cursor: Duration,
    /// `cursor` in ticks at the configured resolution
    pub tick: i64,
    pub emission: Emission,
}

#[derive(Debug)]
pub struct Emitter {
    ppq: u32,
    tempo: Tempo,
    /// Cursor and seconds where `tempo` took over
    anchor: (Duration, f64),
    cursor: Duration,
    pending_offs: BTreeMap<Duration, Vec<MidiEvent>>,
}

impl Emitter {
    pub fn new(ppq: u32) -> Self {
        Self {
            ppq,
            tempo: Tempo::DEFAULT,
            anchor: (Duration::ZERO, 0.0),
            cursor: Duration::ZERO,
            pending_offs: BTreeMap::new(),
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn cursor(&self) -> Duration {
        self.cursor
    }

    pub fn pending_offs(&self) -> usize {
        self.pending_offs.values().map(Vec::len).sum()
    }

    /// Seconds at `cursor` under the current tempo. Only meaningful for
    /// cursors at or after the last tempo change.
    pub fn seconds_at(&self, cursor: Duration) -> f64 {
        let (at, seconds) = self.anchor;
        seconds + self.tempo.seconds(cursor - at)
    }

    fn stamp(&self, cursor: Duration, emission: Emission) -> Emitted {
        Emitted {
            seconds: self.seconds_at(cursor),
            cursor,
            tick: cursor.to_ticks(self.ppq),
            emission,
        }
    }

    fn flush_until(&mut self, cursor: Duration, out: &mut Vec<Emitted>) {
        while let Some(entry) = self.pending_offs.first_entry() {
            if *entry.key() > cursor {
                break;
            }
            let at = *entry.key();
            for off in entry.remove() {
                out.push(self.stamp(at, Emission::Midi(off)));
            }
        }
    }

    fn change_tempo(&mut self, cursor: Duration, tempo: Tempo) {
        if tempo != self.tempo {
            self.anchor = (cursor, self.seconds_at(cursor));
            self.tempo = tempo;
            trace!(%cursor, %tempo, "tempo change");
        }
    }

    /// Everything due up to and including `item`, in output order.
    /// Callbacks run here and produce no output.
    pub fn emit(&mut self, item: Scheduled) -> Vec<Emitted> {
        let mut out = Vec::new();
        let cursor = item.cursor.max(self.cursor);
        self.flush_until(cursor, &mut out);
        self.change_tempo(cursor, item.tempo);
        self.cursor = cursor;

        match item.event {
            Event::Note(note) => {
                let (on, off) = note_to_midi(&note);
                out.push(self.stamp(cursor, Emission::Midi(on)));
                if note.duration.is_positive() {
                    self.pending_offs
                        .entry(cursor + note.duration)
                        .or_default()
                        .push(off);
                } else {
                    out.push(self.stamp(cursor, Emission::Midi(off)));
                }
            }
            Event::Meta(meta) => out.push(self.stamp(cursor, Emission::Meta(meta))),
            Event::Program { channel, program } => out.push(self.stamp(
                cursor,
                Emission::Midi(MidiEvent::ProgramChange { channel, program }),
            )),
            Event::Callback(callback) => callback.call(),
        }
        out
    }

    /// Offs still pending, at their own times.
    pub fn finish(&mut self) -> Vec<Emitted> {
        let mut out = Vec::new();
        if let Some(last) = self.pending_offs.keys().next_back().copied() {
            self.flush_until(last, &mut out);
            self.cursor = self.cursor.max(last);
        }
        out
    }

    /// Offs for every sounding note, all at the current cursor.
    pub fn release_all(&mut self) -> Vec<Emitted> {
        let offs: Vec<MidiEvent> = std::mem::take(&mut self.pending_offs)
            .into_values()
            .flatten()
            .collect();
        offs.into_iter()
            .map(|off| self.stamp(self.cursor, Emission::Midi(off)))
            .collect()
    }
}
