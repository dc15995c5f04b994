/*
Rhythm patterns
===============

A pattern is one cycle (one bar) of hits where timing is implicit in
position. The bar is split evenly between top-level slots; a bracketed
subdivision splits its slot again, by weight.

    [K, H, S, H]          = four hits, one per quarter in 4/4
    [K, [H, H], S, _]     = quarter, two eighths, quarter, rest
    [[K, K, K], _, S, _]  = triplet on the first beat

The pattern does not know the bar length. `Pattern::hits` lays it over
whatever bar it is given, so the same groove fits 4/4, 3/4 or 7/8, and every
offset stays an exact `Duration`.
*/

use std::str::FromStr;

use num_rational::Rational64;

use super::duration::Duration;
use crate::error::{GrilleError, Result};

/// General MIDI percussion keys (channel 10).
pub mod drums {
    pub const KICK: u8 = 36;
    pub const RIM: u8 = 37;
    pub const SNARE: u8 = 38;
    pub const CLAP: u8 = 39;
    pub const CLOSED_HAT: u8 = 42;
    pub const PEDAL_HAT: u8 = 44;
    pub const OPEN_HAT: u8 = 46;
    pub const LOW_TOM: u8 = 45;
    pub const HIGH_TOM: u8 = 50;
    pub const CRASH: u8 = 49;
    pub const RIDE: u8 = 51;
    pub const COWBELL: u8 = 56;

    /// Short names accepted in pattern text.
    pub fn by_name(name: &str) -> Option<u8> {
        let key = match name.to_ascii_lowercase().as_str() {
            "k" | "kick" | "bd" => KICK,
            "r" | "rim" => RIM,
            "s" | "snare" | "sd" => SNARE,
            "c" | "clap" => CLAP,
            "h" | "hat" | "hh" => CLOSED_HAT,
            "p" | "pedal" => PEDAL_HAT,
            "o" | "open" | "oh" => OPEN_HAT,
            "lt" | "tom" => LOW_TOM,
            "ht" => HIGH_TOM,
            "x" | "crash" => CRASH,
            "ride" => RIDE,
            "bell" | "cowbell" => COWBELL,
            _ => return None,
        };
        Some(key)
    }
}

/// A slot in a pattern: a hit, a rest, or a subdivision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSlot {
    Hit(HitSlot),
    Rest,
    Subdivision(Vec<PatternSlot>),
}

/// A struck key with a velocity and a weight for uneven subdivisions.
/// In `[K@2, H]`, the kick gets 2/3 of the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitSlot {
    pub key: u8,
    pub velocity: u8,
    pub weight: u8,
}

impl HitSlot {
    pub fn new(key: u8) -> Self {
        Self {
            key,
            velocity: 100,
            weight: 1,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }
}

impl From<u8> for PatternSlot {
    fn from(key: u8) -> Self {
        PatternSlot::Hit(HitSlot::new(key))
    }
}

impl PatternSlot {
    fn weight(&self) -> i64 {
        match self {
            PatternSlot::Hit(hit) => i64::from(hit.weight),
            _ => 1,
        }
    }
}

/// One hit laid out over a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Offset from the start of the bar
    pub offset: Duration,
    /// Span of the slot the hit occupies
    pub length: Duration,
    pub key: u8,
    pub velocity: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub slots: Vec<PatternSlot>,
}

impl Pattern {
    pub fn new(slots: Vec<PatternSlot>) -> Self {
        Self { slots }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lay the pattern over one bar of length `bar`, in time order.
    pub fn hits(&self, bar: Duration) -> Result<Vec<Hit>> {
        let mut hits = Vec::new();
        if self.slots.is_empty() {
            return Ok(hits);
        }

        let per_slot = bar / self.slots.len() as i64;
        let mut cursor = Duration::ZERO;
        for slot in &self.slots {
            Self::expand_slot(slot, cursor, per_slot, &mut hits)?;
            cursor += per_slot;
        }
        Ok(hits)
    }

    fn expand_slot(slot: &PatternSlot, start: Duration, length: Duration, hits: &mut Vec<Hit>) -> Result<()> {
        match slot {
            PatternSlot::Hit(hit) => hits.push(Hit {
                offset: start,
                length,
                key: hit.key,
                velocity: hit.velocity,
            }),
            PatternSlot::Rest => {}
            PatternSlot::Subdivision(inner) => {
                let total: i64 = inner.iter().map(PatternSlot::weight).sum();
                if total == 0 {
                    return Err(GrilleError::invalid("pattern", "empty subdivision"));
                }

                let mut cursor = start;
                for sub in inner {
                    let sub_length = length.scale(Rational64::new(sub.weight(), total));
                    Self::expand_slot(sub, cursor, sub_length, hits)?;
                    cursor += sub_length;
                }
            }
        }
        Ok(())
    }
}

fn parse_hit(token: &str, whole: &str) -> Result<PatternSlot> {
    let (name, weight) = match token.split_once('@') {
        Some((name, weight)) => (
            name,
            weight
                .parse::<u8>()
                .ok()
                .filter(|w| *w > 0)
                .ok_or_else(|| GrilleError::invalid("pattern weight", whole))?,
        ),
        None => (token, 1),
    };
    let (name, velocity) = match name.strip_suffix('!') {
        Some(name) => (name, 127),
        None => (name, 100),
    };
    let key = match name.parse::<u8>() {
        Ok(key) if key <= 127 => key,
        Ok(_) => return Err(GrilleError::MidiRange(name.to_string())),
        Err(_) => drums::by_name(name).ok_or_else(|| GrilleError::invalid("drum", name))?,
    };
    Ok(PatternSlot::Hit(
        HitSlot::new(key).with_velocity(velocity).with_weight(weight),
    ))
}

impl FromStr for Pattern {
    type Err = GrilleError;

    /// `k h s h`, `k [h h] s _`, `[k@2 h] . s! .`, `36 42 38 42`.
    ///
    /// `_` or `.` is a rest, brackets subdivide, `!` accents, `@n` weights.
    fn from_str(s: &str) -> Result<Self> {
        let spaced = s.replace('[', " [ ").replace(']', " ] ");
        let mut stack: Vec<Vec<PatternSlot>> = vec![Vec::new()];

        for token in spaced.split_whitespace() {
            match token {
                "[" => stack.push(Vec::new()),
                "]" => {
                    let inner = stack.pop().filter(|_| !stack.is_empty());
                    let inner = inner.ok_or_else(|| GrilleError::invalid("pattern", s))?;
                    if inner.is_empty() {
                        return Err(GrilleError::invalid("pattern", s));
                    }
                    if let Some(level) = stack.last_mut() {
                        level.push(PatternSlot::Subdivision(inner));
                    }
                }
                "_" | "." => {
                    if let Some(level) = stack.last_mut() {
                        level.push(PatternSlot::Rest);
                    }
                }
                hit => {
                    let slot = parse_hit(hit, s)?;
                    if let Some(level) = stack.last_mut() {
                        level.push(slot);
                    }
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(slots), true) => Ok(Pattern::new(slots)),
            _ => Err(GrilleError::invalid("pattern", s)),
        }
    }
}

/// Build a [`Pattern`] from slot literals.
///
/// ```
/// use grille::pattern;
/// use grille::sequencing::pattern::drums::*;
///
/// let rock = pattern!([KICK, CLOSED_HAT, SNARE, CLOSED_HAT]);
/// let busy = pattern!([KICK, [CLOSED_HAT, CLOSED_HAT], SNARE, _]);
/// assert_eq!(rock.slots.len(), 4);
/// assert_eq!(busy.slots.len(), 4);
/// ```
#[macro_export]
macro_rules! pattern {
    ([$($slot:tt),* $(,)?]) => {
        $crate::sequencing::Pattern::new(
            vec![$($crate::pattern!(@slot $slot)),*]
        )
    };

    (@slot _) => {
        $crate::sequencing::PatternSlot::Rest
    };

    (@slot [$($inner:tt),* $(,)?]) => {
        $crate::sequencing::PatternSlot::Subdivision(
            vec![$($crate::pattern!(@slot $inner)),*]
        )
    };

    (@slot $key:expr) => {
        $crate::sequencing::PatternSlot::from($key)
    };
}

pub use pattern;

/// Helper functions for building pattern slots
pub mod slot {
    use super::*;

    pub fn hit(key: u8) -> PatternSlot {
        PatternSlot::Hit(HitSlot::new(key))
    }

    pub fn accent(key: u8) -> PatternSlot {
        PatternSlot::Hit(HitSlot::new(key).with_velocity(127))
    }

    pub fn weighted(key: u8, weight: u8) -> PatternSlot {
        PatternSlot::Hit(HitSlot::new(key).with_weight(weight))
    }

    pub fn rest() -> PatternSlot {
        PatternSlot::Rest
    }

    pub fn sub(slots: Vec<PatternSlot>) -> PatternSlot {
        PatternSlot::Subdivision(slots)
    }
}
