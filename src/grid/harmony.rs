use crate::error::{GrilleError, Result};
use crate::sequencing::{Duration, Tempo, TimeSignature};
use crate::theory::{Chord, Scale};

/// A chord and how long it lasts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordItem {
    chord: Chord,
    /// Duration as written; `None` fills to the next barline
    declared: Option<Duration>,
    /// Duration after resolution
    duration: Duration,
    /// Offset from the start of the owning harmony item
    offset: Duration,
}

impl ChordItem {
    pub fn new(chord: Chord, declared: Option<Duration>) -> Result<Self> {
        if let Some(duration) = declared {
            if !duration.is_positive() {
                return Err(GrilleError::InvalidStep(duration.to_string()));
            }
        }
        Ok(Self {
            chord,
            declared,
            duration: declared.unwrap_or_default(),
            offset: Duration::ZERO,
        })
    }

    pub fn chord(&self) -> &Chord {
        &self.chord
    }

    pub fn declared(&self) -> Option<Duration> {
        self.declared
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn end(&self) -> Duration {
        self.offset + self.duration
    }

    pub(super) fn place(&mut self, offset: Duration, duration: Duration) {
        self.offset = offset;
        self.duration = duration;
    }
}

/// One scale, tempo and meter, and the chords played under them.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonyItem {
    scale: Scale,
    tempo: Tempo,
    time_signature: TimeSignature,
    chords: Vec<ChordItem>,
}

impl HarmonyItem {
    pub fn new(
        scale: Scale,
        tempo: Tempo,
        time_signature: TimeSignature,
        chords: Vec<ChordItem>,
    ) -> Result<Self> {
        if chords.is_empty() {
            return Err(GrilleError::EmptyGrid);
        }
        let mut item = Self {
            scale,
            tempo,
            time_signature,
            chords,
        };
        item.resolve_durations();
        Ok(item)
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn chords(&self) -> &[ChordItem] {
        &self.chords
    }

    pub fn chord(&self, index: usize) -> Option<&ChordItem> {
        self.chords.get(index)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Total span of the item's chords.
    pub fn duration(&self) -> Duration {
        self.chords.iter().map(ChordItem::duration).sum()
    }

    pub(super) fn chords_mut(&mut self) -> &mut Vec<ChordItem> {
        &mut self.chords
    }
}

/// The whole progression: harmony items in play order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    items: Vec<HarmonyItem>,
}

impl Grid {
    pub fn new(items: Vec<HarmonyItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(GrilleError::EmptyGrid);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[HarmonyItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&HarmonyItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of chords across all items.
    pub fn chord_count(&self) -> usize {
        self.items.iter().map(HarmonyItem::len).sum()
    }

    pub(super) fn items_mut(&mut self) -> &mut Vec<HarmonyItem> {
        &mut self.items
    }
}
