//! Playback - paced output of a scheduled progression
//!
//! Pulls merged events from the [`Scheduler`], times them through the
//! [`Emitter`] and hands them to a sink, sleeping out the gap between
//! events. A stop request is honoured between events: whatever is still
//! sounding gets its note-off and playback returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::engine::Scheduler;
use crate::error::Result;
use crate::io::{Emitted, Emitter, OutputSink};

/// Time source for pacing.
pub trait Clock {
    /// Seconds since the clock started.
    fn now(&self) -> f64;

    fn sleep(&mut self, seconds: f64);

    /// Count from zero again. Called when playback starts.
    fn restart(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, seconds: f64) {
        std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
    }

    fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// A clock that only moves when slept on. Renders as fast as possible
/// while still reporting the waits a real clock would have made.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: f64,
    sleeps: Vec<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> &[f64] {
        &self.sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn sleep(&mut self, seconds: f64) {
        self.sleeps.push(seconds);
        self.now += seconds;
    }
}

/// Shared stop flag. Clones all refer to the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackReport {
    /// Events handed to the sink
    pub events: usize,
    /// Wall-clock position of the last event
    pub seconds: f64,
    pub stopped: bool,
}

pub struct Playback<C> {
    emitter: Emitter,
    clock: C,
    stop: StopHandle,
    paced: bool,
    report: PlaybackReport,
}

impl Playback<SystemClock> {
    /// Real-time playback on the system clock.
    pub fn new(ppq: u32) -> Self {
        Self::with_clock(ppq, SystemClock::new())
    }
}

impl<C: Clock> Playback<C> {
    pub fn with_clock(ppq: u32, clock: C) -> Self {
        Self {
            emitter: Emitter::new(ppq),
            clock,
            stop: StopHandle::new(),
            paced: true,
            report: PlaybackReport::default(),
        }
    }

    /// Emit without sleeping.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn deliver<S: OutputSink + ?Sized>(&mut self, events: Vec<Emitted>, sink: &mut S) -> Result<()> {
        for event in events {
            if self.paced {
                let wait = event.seconds - self.clock.now();
                if wait > 0.0 {
                    self.clock.sleep(wait);
                }
            }
            sink.send(&event)?;
            self.report.events += 1;
            self.report.seconds = event.seconds;
        }
        Ok(())
    }

    /// Play until the scheduler is exhausted or a stop is requested.
    pub fn run<S: OutputSink + ?Sized>(
        &mut self,
        scheduler: Scheduler,
        sink: &mut S,
    ) -> Result<PlaybackReport> {
        info!(players = scheduler.player_count(), paced = self.paced, "playback started");
        self.report = PlaybackReport::default();
        self.clock.restart();

        for item in scheduler {
            if self.stop.is_stopped() {
                break;
            }
            let events = self.emitter.emit(item?);
            self.deliver(events, sink)?;
        }

        if self.stop.is_stopped() {
            let sounding = self.emitter.pending_offs();
            if sounding > 0 {
                warn!(sounding, "stopped with notes sounding, releasing");
            }
            let offs = self.emitter.release_all();
            // release right away, no waiting on the clock
            for event in offs {
                sink.send(&event)?;
                self.report.events += 1;
            }
            self.report.stopped = true;
        } else {
            let offs = self.emitter.finish();
            self.deliver(offs, sink)?;
        }
        sink.flush()?;

        info!(
            events = self.report.events,
            seconds = self.report.seconds,
            stopped = self.report.stopped,
            "playback finished"
        );
        Ok(self.report)
    }
}
