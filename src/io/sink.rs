//! Output sinks - where emitted events end up

#[cfg(feature = "rtrb")]
use rtrb::Consumer;
use tracing::info;

use super::converter::midi_note_to_freq;
use super::emitter::{Emission, Emitted};
use super::midi::MidiEvent;
use crate::error::Result;

/// Receives every emitted event, one call each, in order.
pub trait OutputSink {
    fn send(&mut self, event: &Emitted) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn send(&mut self, event: &Emitted) -> Result<()> {
        (**self).send(event)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn send(&mut self, event: &Emitted) -> Result<()> {
        (**self).send(event)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Writes each event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn send(&mut self, event: &Emitted) -> Result<()> {
        let seconds = format!("{:.3}", event.seconds);
        match &event.emission {
            Emission::Midi(midi @ MidiEvent::NoteOn { key, .. }) => info!(
                target: "grille::output",
                %seconds,
                tick = event.tick,
                cursor = %event.cursor,
                freq = midi_note_to_freq(*key),
                "{midi}"
            ),
            Emission::Midi(midi) => info!(
                target: "grille::output",
                %seconds,
                tick = event.tick,
                cursor = %event.cursor,
                "{midi}"
            ),
            Emission::Meta(meta) => info!(
                target: "grille::output",
                %seconds,
                tick = event.tick,
                cursor = %event.cursor,
                "{meta}"
            ),
        }
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<Emitted>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Emitted] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Emitted> {
        self.events
    }

    pub fn midi(&self) -> impl Iterator<Item = &MidiEvent> {
        self.events.iter().filter_map(|event| match &event.emission {
            Emission::Midi(midi) => Some(midi),
            Emission::Meta(_) => None,
        })
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, event: &Emitted) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Source of events for a transport running on its own thread.
pub trait EmissionReceiver {
    fn pop(&mut self) -> Option<Emitted>;
}

#[cfg(feature = "rtrb")]
impl EmissionReceiver for Consumer<Emitted> {
    fn pop(&mut self) -> Option<Emitted> {
        Consumer::pop(self).ok()
    }
}

/// Forward everything currently queued in `receiver` to `sink`.
pub fn drain<R, S>(receiver: &mut R, sink: &mut S) -> Result<usize>
where
    R: EmissionReceiver + ?Sized,
    S: OutputSink + ?Sized,
{
    let mut count = 0;
    while let Some(event) = receiver.pop() {
        sink.send(&event)?;
        count += 1;
    }
    Ok(count)
}
