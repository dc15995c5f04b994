//! Cursor over a grid's chords.
//!
//! The cursor names a (harmony item, chord) pair. Stepping past the last
//! chord of an item moves into the next item; stepping past the last item
//! wraps to the first. Structural edits keep the cursor on the chord it
//! pointed at whenever that chord still exists.

use std::fmt;

use tracing::debug;

use super::harmony::{ChordItem, Grid, HarmonyItem};
use crate::error::{GrilleError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub harmony: usize,
    pub chord: usize,
}

impl Position {
    pub const fn new(harmony: usize, chord: usize) -> Self {
        Self { harmony, chord }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.harmony, self.chord)
    }
}

#[derive(Debug, Clone)]
pub struct Progression {
    grid: Grid,
    cursor: Position,
    chord_loop: bool,
    /// Set when a removal slid an unplayed chord under the cursor; the
    /// next advance stays put. Holds whether the slide wrapped.
    slid: Option<bool>,
}

impl Progression {
    pub fn new(grid: Grid) -> Result<Self> {
        if grid.chord_count() == 0 {
            return Err(GrilleError::EmptyGrid);
        }
        Ok(Self {
            grid,
            cursor: Position::default(),
            chord_loop: false,
            slid: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn position(&self) -> Position {
        self.cursor
    }

    pub fn harmony(&self) -> &HarmonyItem {
        &self.grid.items()[self.cursor.harmony]
    }

    pub fn chord(&self) -> &ChordItem {
        &self.harmony().chords()[self.cursor.chord]
    }

    pub fn is_chord_loop(&self) -> bool {
        self.chord_loop
    }

    /// Keep returning the current chord from [`Progression::advance`].
    pub fn set_chord_loop(&mut self, chord_loop: bool) {
        self.chord_loop = chord_loop;
    }

    /// Step to the next chord. Returns `true` when the step wrapped back to
    /// the first chord of the grid.
    ///
    /// After a removal moved the cursor onto the following chord, the next
    /// call lands on that chord instead of stepping past it.
    pub fn advance(&mut self) -> bool {
        if let Some(wrapped) = self.slid.take() {
            return wrapped;
        }
        if self.chord_loop {
            return false;
        }
        let Position { harmony, chord } = self.cursor;
        if chord + 1 < self.grid.items()[harmony].len() {
            self.cursor.chord += 1;
            return false;
        }
        let wrapped = harmony + 1 >= self.grid.len();
        self.cursor = Position::new(if wrapped { 0 } else { harmony + 1 }, 0);
        wrapped
    }

    /// Step to the previous chord. Returns `true` when the step wrapped to
    /// the last chord of the grid.
    pub fn retreat(&mut self) -> bool {
        self.slid = None;
        if self.chord_loop {
            return false;
        }
        let Position { harmony, chord } = self.cursor;
        if chord > 0 {
            self.cursor.chord -= 1;
            return false;
        }
        let wrapped = harmony == 0;
        let harmony = if wrapped { self.grid.len() - 1 } else { harmony - 1 };
        self.cursor = Position::new(harmony, self.grid.items()[harmony].len() - 1);
        wrapped
    }

    fn check(&self, position: Position) -> Result<()> {
        match self.grid.item(position.harmony) {
            Some(item) if position.chord < item.len() => Ok(()),
            _ => Err(GrilleError::ProgressionIndex {
                harmony: position.harmony,
                chord: position.chord,
            }),
        }
    }

    pub fn jump(&mut self, position: Position) -> Result<()> {
        self.check(position)?;
        self.cursor = position;
        self.slid = None;
        Ok(())
    }

    pub fn rewind(&mut self) {
        self.cursor = Position::default();
        self.slid = None;
    }

    /// Insert a chord so it ends up at `position`. `position.chord` may be
    /// one past the end of the item to append.
    pub fn insert_chord(&mut self, position: Position, chord: ChordItem) -> Result<()> {
        let index_error = GrilleError::ProgressionIndex {
            harmony: position.harmony,
            chord: position.chord,
        };
        let item = self
            .grid
            .items_mut()
            .get_mut(position.harmony)
            .ok_or(index_error)?;
        if position.chord > item.len() {
            return Err(GrilleError::ProgressionIndex {
                harmony: position.harmony,
                chord: position.chord,
            });
        }
        item.chords_mut().insert(position.chord, chord);
        item.resolve_durations();

        if self.cursor.harmony == position.harmony && self.cursor.chord >= position.chord {
            self.cursor.chord += 1;
        }
        debug!(%position, cursor = %self.cursor, "inserted chord");
        Ok(())
    }

    /// Remove the chord at `position`. Removing the last chord of an item
    /// removes the item; removing the last chord of the grid is refused.
    pub fn remove_chord(&mut self, position: Position) -> Result<ChordItem> {
        self.check(position)?;
        if self.grid.chord_count() == 1 {
            return Err(GrilleError::EmptyGrid);
        }
        if self.grid.items()[position.harmony].len() == 1 {
            let mut removed = self.remove_harmony(position.harmony)?;
            return removed
                .chords_mut()
                .pop()
                .ok_or(GrilleError::EmptyGrid);
        }

        let item = &mut self.grid.items_mut()[position.harmony];
        let removed = item.chords_mut().remove(position.chord);
        item.resolve_durations();
        let len = item.len();

        if self.cursor.harmony == position.harmony {
            if self.cursor.chord > position.chord {
                self.cursor.chord -= 1;
            } else if self.cursor.chord >= len {
                // removed the chord under the cursor at the end of the item
                self.cursor.chord = len - 1;
            } else if self.cursor.chord == position.chord {
                self.slid = Some(false);
            }
        }
        debug!(%position, cursor = %self.cursor, "removed chord");
        Ok(removed)
    }

    /// Insert a harmony item at `index` (`index == len` appends).
    pub fn insert_harmony(&mut self, index: usize, item: HarmonyItem) -> Result<()> {
        if index > self.grid.len() {
            return Err(GrilleError::ProgressionIndex {
                harmony: index,
                chord: 0,
            });
        }
        self.grid.items_mut().insert(index, item);
        if self.cursor.harmony >= index {
            self.cursor.harmony += 1;
        }
        debug!(index, cursor = %self.cursor, "inserted harmony item");
        Ok(())
    }

    pub fn remove_harmony(&mut self, index: usize) -> Result<HarmonyItem> {
        if index >= self.grid.len() {
            return Err(GrilleError::ProgressionIndex {
                harmony: index,
                chord: 0,
            });
        }
        if self.grid.len() == 1 {
            return Err(GrilleError::EmptyGrid);
        }
        let removed = self.grid.items_mut().remove(index);
        let len = self.grid.len();

        if self.cursor.harmony > index {
            self.cursor.harmony -= 1;
        } else if self.cursor.harmony == index {
            // the next item slides under the cursor; past the end, wrap
            let wrapped = index >= len;
            self.cursor = Position::new(if wrapped { 0 } else { index }, 0);
            self.slid = Some(wrapped);
        }
        debug!(index, cursor = %self.cursor, "removed harmony item");
        Ok(removed)
    }
}
