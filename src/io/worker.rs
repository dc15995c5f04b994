//! Output worker - transport on its own thread
//!
//! Generation pushes into an rtrb ring buffer through [`QueueSink`]; the
//! worker thread pops and forwards to the real sink, so a slow transport
//! never stalls scheduling for longer than it takes the queue to fill.

use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;

use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::{debug, warn};

use super::emitter::Emitted;
use super::sink::{drain, OutputSink};
use crate::error::{GrilleError, Result};

const IDLE_WAIT: StdDuration = StdDuration::from_millis(1);

/// Producer end of the worker queue.
pub struct QueueSink {
    tx: Producer<Emitted>,
}

impl OutputSink for QueueSink {
    /// Waits for room when the queue is full; fails once the worker is gone.
    fn send(&mut self, event: &Emitted) -> Result<()> {
        let mut event = event.clone();
        loop {
            match self.tx.push(event) {
                Ok(()) => return Ok(()),
                Err(PushError::Full(back)) => {
                    if self.tx.is_abandoned() {
                        return Err(GrilleError::SinkClosed);
                    }
                    event = back;
                    thread::yield_now();
                }
            }
        }
    }
}

pub struct OutputWorker<S> {
    handle: JoinHandle<Result<S>>,
}

impl<S: OutputSink + Send + 'static> OutputWorker<S> {
    /// Spawn the transport thread. Dropping the returned [`QueueSink`]
    /// lets the worker drain what is left and finish.
    pub fn spawn(capacity: usize, sink: S) -> Result<(QueueSink, Self)> {
        let (tx, rx) = RingBuffer::<Emitted>::new(capacity.max(1));
        let handle = thread::Builder::new()
            .name("grille-output".into())
            .spawn(move || run(rx, sink))?;
        Ok((QueueSink { tx }, Self { handle }))
    }

    /// Wait for the worker to finish and take the sink back.
    pub fn join(self) -> Result<S> {
        self.handle.join().map_err(|_| {
            warn!("output worker panicked");
            GrilleError::SinkClosed
        })?
    }
}

fn run<S: OutputSink>(mut rx: Consumer<Emitted>, mut sink: S) -> Result<S> {
    let mut forwarded = 0;
    loop {
        let abandoned = rx.is_abandoned();
        let count = drain(&mut rx, &mut sink)?;
        forwarded += count;
        if abandoned && count == 0 {
            break;
        }
        if count == 0 {
            thread::sleep(IDLE_WAIT);
        }
    }
    sink.flush()?;
    debug!(forwarded, "output worker finished");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::emitter::Emission;
    use crate::io::midi::MidiEvent;
    use crate::io::sink::RecordingSink;
    use crate::sequencing::Duration;

    fn on(key: u8) -> Emitted {
        Emitted {
            seconds: 0.0,
            cursor: Duration::ZERO,
            tick: 0,
            emission: Emission::Midi(MidiEvent::NoteOn {
                channel: 0,
                key,
                velocity: 100,
            }),
        }
    }

    #[test]
    fn forwards_everything_in_order() {
        // a queue smaller than the burst forces the producer to wait
        let (mut tx, worker) = OutputWorker::spawn(4, RecordingSink::new()).unwrap();
        for key in 0..64 {
            tx.send(&on(key)).unwrap();
        }
        drop(tx);

        let sink = worker.join().unwrap();
        let keys: Vec<u8> = sink
            .midi()
            .filter_map(|m| match m {
                MidiEvent::NoteOn { key, .. } => Some(*key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, (0..64).collect::<Vec<u8>>());
    }
}
