// Purpose - output side: MIDI messages, timing, sinks

pub mod converter;
pub mod emitter;
pub mod midi;
pub mod sink;
#[cfg(feature = "rtrb")]
pub mod worker;

pub use emitter::{Emission, Emitted, Emitter};
pub use midi::MidiEvent;
pub use sink::{EmissionReceiver, LogSink, OutputSink, RecordingSink};
#[cfg(feature = "rtrb")]
pub use worker::{OutputWorker, QueueSink};
