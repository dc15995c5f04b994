//! Field maps that describe a grid.
//!
//! These are the structured form of the notation: one [`HarmonyFields`] per
//! harmony item and one [`ChordFields`] per chord. They deserialize from
//! song files, and the flat text forms (`bpm=90 ts=3/4 sc=C_major p=I,V,I`
//! and `A4maj7:i=1:e=9`) parse into them directly.

use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use super::harmony::{ChordItem, Grid, HarmonyItem};
use crate::config::Config;
use crate::error::{GrilleError, Result};
use crate::sequencing::{Duration, Tempo, TimeSignature};
use crate::theory::{Chord, Degree, Interval, Scale};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChordFields {
    pub root: Option<String>,
    pub degree: Option<String>,
    #[serde(alias = "q")]
    pub quality: Option<String>,
    #[serde(alias = "i")]
    pub inversion: Option<usize>,
    #[serde(alias = "b")]
    pub bass: Option<String>,
    #[serde(alias = "e", default)]
    pub extensions: Vec<String>,
    #[serde(alias = "d")]
    pub duration: Option<String>,
}

impl ChordFields {
    /// Read a bare progression entry: a degree when it parses as one,
    /// otherwise a chord symbol.
    fn from_head(text: &str) -> Result<Self> {
        if text.parse::<Degree>().is_ok() {
            return Ok(Self {
                degree: Some(text.to_string()),
                ..Self::default()
            });
        }
        // degree with a named quality, such as `IImin7` or `V7`
        if let Some(split) = (1..text.len()).rev().find(|i| {
            text.is_char_boundary(*i) && text[..*i].parse::<Degree>().is_ok()
        }) {
            let (degree, quality) = text.split_at(split);
            if crate::theory::ChordQuality::lookup(quality).is_ok() {
                return Ok(Self {
                    degree: Some(degree.to_string()),
                    quality: Some(quality.to_string()),
                    ..Self::default()
                });
            }
        }
        let chord: Chord = text.parse()?;
        Ok(Self {
            root: Some(chord.root().to_string()),
            quality: Some(chord.quality().name.to_string()),
            ..Self::default()
        })
    }

    /// Build the chord against `scale`, with its written duration.
    pub fn build(&self, scale: &Scale) -> Result<ChordItem> {
        let mut builder = Chord::builder().scale(scale);
        match (&self.root, &self.degree) {
            (Some(_), Some(_)) => {
                return Err(GrilleError::invalid("chord", "both root and degree given"));
            }
            (Some(root), None) => builder = builder.root(root.parse()?),
            (None, Some(degree)) => builder = builder.degree(degree.parse()?),
            (None, None) => return Err(GrilleError::invalid("chord", "no root or degree")),
        }
        if let Some(quality) = &self.quality {
            builder = builder.quality(quality.as_str());
        }
        if let Some(inversion) = self.inversion {
            builder = builder.inversion(inversion);
        }
        if let Some(bass) = &self.bass {
            builder = builder.bass(bass.parse()?);
        }
        let extensions = self
            .extensions
            .iter()
            .map(|e| e.parse::<Interval>())
            .collect::<Result<Vec<_>>>()?;
        let duration = self.duration.as_deref().map(Duration::parse).transpose()?;

        ChordItem::new(builder.extensions(extensions).build()?, duration)
    }
}

impl FromStr for ChordFields {
    type Err = GrilleError;

    /// `II`, `V7`, `A4maj7:i=1:b=E:e=9,11:d=H`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split(':');
        let head = parts.next().unwrap_or_default();
        let mut fields = Self::from_head(head)?;

        for part in parts {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| GrilleError::invalid("chord modifier", part))?;
            match key {
                "q" | "quality" => fields.quality = Some(value.to_string()),
                "i" | "inversion" => {
                    fields.inversion = Some(
                        value
                            .parse()
                            .map_err(|_| GrilleError::invalid("inversion", value))?,
                    )
                }
                "b" | "bass" => fields.bass = Some(value.to_string()),
                "e" | "extensions" => {
                    fields.extensions = value.split(',').map(str::to_string).collect()
                }
                "d" | "duration" => fields.duration = Some(value.to_string()),
                _ => return Err(GrilleError::invalid("chord modifier", part)),
            }
        }
        Ok(fields)
    }
}

/// A progression entry: notation text or an explicit table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChordEntry {
    Text(String),
    Fields(ChordFields),
}

impl ChordEntry {
    pub fn fields(&self) -> Result<ChordFields> {
        match self {
            ChordEntry::Text(text) => text.parse(),
            ChordEntry::Fields(fields) => Ok(fields.clone()),
        }
    }
}

/// `p` as one comma-separated string or as a list of entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProgressionField {
    Text(String),
    Entries(Vec<ChordEntry>),
}

impl Default for ProgressionField {
    fn default() -> Self {
        ProgressionField::Entries(Vec::new())
    }
}

impl ProgressionField {
    pub fn entries(&self) -> Vec<ChordEntry> {
        match self {
            ProgressionField::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| ChordEntry::Text(t.to_string()))
                .collect(),
            ProgressionField::Entries(entries) => entries.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarmonyFields {
    #[serde(alias = "tempo")]
    pub bpm: Option<f64>,
    #[serde(alias = "time_signature")]
    pub ts: Option<String>,
    #[serde(alias = "scale")]
    pub sc: Option<String>,
    #[serde(alias = "progression", default)]
    pub p: ProgressionField,
}

impl FromStr for HarmonyFields {
    type Err = GrilleError;

    /// `bpm=90 ts=3/4 sc=C_major p=I,V,I`.
    fn from_str(s: &str) -> Result<Self> {
        let mut fields = Self::default();
        for pair in s.split_whitespace() {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| GrilleError::invalid("harmony field", pair))?;
            match key {
                "bpm" | "tempo" => {
                    fields.bpm = Some(value.parse().map_err(|_| GrilleError::invalid("bpm", value))?)
                }
                "ts" => fields.ts = Some(value.to_string()),
                "sc" | "scale" => fields.sc = Some(value.to_string()),
                "p" => fields.p = ProgressionField::Text(value.to_string()),
                _ => return Err(GrilleError::invalid("harmony field", pair)),
            }
        }
        Ok(fields)
    }
}

/// Turns field maps into a [`Grid`]. Tempo, meter and scale carry over from
/// one harmony item to the next; the first item falls back to the config.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    tempo: Tempo,
    time_signature: TimeSignature,
    scale: Scale,
}

impl GridBuilder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            tempo: config.tempo()?,
            time_signature: config.time_signature()?,
            scale: config.scale()?,
        })
    }

    /// Items with an empty progression only change the inherited settings.
    pub fn build(&self, items: &[HarmonyFields]) -> Result<Grid> {
        let mut tempo = self.tempo;
        let mut time_signature = self.time_signature;
        let mut scale = self.scale.clone();
        let mut harmony = Vec::with_capacity(items.len());

        for fields in items {
            if let Some(bpm) = fields.bpm {
                tempo = Tempo::new(bpm)?;
            }
            if let Some(ts) = &fields.ts {
                time_signature = ts.parse()?;
            }
            if let Some(sc) = &fields.sc {
                scale = sc.parse()?;
            }

            let chords = fields
                .p
                .entries()
                .iter()
                .map(|entry| entry.fields()?.build(&scale))
                .collect::<Result<Vec<_>>>()?;
            if chords.is_empty() {
                continue;
            }
            debug!(%scale, %tempo, %time_signature, chords = chords.len(), "harmony item");
            harmony.push(HarmonyItem::new(scale.clone(), tempo, time_signature, chords)?);
        }
        Grid::new(harmony)
    }
}
