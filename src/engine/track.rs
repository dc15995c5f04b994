//! Track - one player's slot in the merge
//!
//! A track holds the player, the one item pulled ahead of the merge, and a
//! carry slot for an item that belongs to a later segment than the one
//! being merged.

use tracing::{debug, trace};

use super::player::{Event, Player, PlayerContext};
use crate::error::Result;
use crate::sequencing::{Duration, TimeSignature};

pub struct Track {
    player: Box<dyn Player>,
    /// Next item of the current segment, if any
    pending: Option<(Duration, Event)>,
    /// Item pulled past the segment end, replayed next segment
    carry: Option<(Duration, Event)>,
    /// Time signature of the last setup, for free players
    time_signature: Option<TimeSignature>,
}

impl Track {
    pub fn new(player: Box<dyn Player>) -> Self {
        Self {
            player,
            pending: None,
            carry: None,
            time_signature: None,
        }
    }

    pub fn name(&self) -> &str {
        self.player.name()
    }

    pub fn is_time_signature_bound(&self) -> bool {
        self.player.is_time_signature_bound()
    }

    pub fn pending_cursor(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(cursor, _)| *cursor)
    }

    pub fn has_carry(&self) -> bool {
        self.carry.is_some()
    }

    /// Prepare for a new segment. Bound players always restart; free
    /// players restart only when the time signature changed, otherwise they
    /// keep their stream and their carry.
    pub fn begin(&mut self, ctx: &PlayerContext) -> Result<()> {
        let restart = self.player.is_time_signature_bound()
            || self.time_signature != Some(ctx.time_signature);

        if restart {
            if self.carry.take().is_some() {
                debug!(player = self.name(), "carry dropped on restart");
            }
            if !self.player.is_time_signature_bound() {
                debug!(player = self.name(), time_signature = %ctx.time_signature, "restart");
            }
            self.player.setup(ctx)?;
        } else {
            self.player.on_context(ctx)?;
        }
        self.time_signature = Some(ctx.time_signature);

        self.pending = None;
        match self.carry.take() {
            Some(item) if item.0 < ctx.end => {
                trace!(player = self.name(), cursor = %item.0, "replaying carry");
                self.pending = Some(item);
            }
            Some(item) => self.carry = Some(item),
            None => self.pull(ctx.end),
        }
        Ok(())
    }

    /// Hand over the pending item and pull the next one.
    pub fn take(&mut self, end: Duration) -> Option<(Duration, Event)> {
        let item = self.pending.take()?;
        self.pull(end);
        Some(item)
    }

    fn pull(&mut self, end: Duration) {
        match self.player.next() {
            Some(item) if item.0 < end => self.pending = Some(item),
            Some(item) => {
                trace!(player = self.name(), cursor = %item.0, "carrying past segment end");
                self.carry = Some(item);
            }
            None => {}
        }
    }
}
