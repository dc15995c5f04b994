//! Concrete players.
//!
//! [`PlayerSpec`] is the song-file form of a player:
//!
//! ```toml
//! [[player]]
//! kind = "arpeggio"
//! direction = "up_down"
//! step = "E"
//!
//! [[player]]
//! kind = "drums"
//! pattern = "k h s h"
//! ```

pub mod arpeggio;
pub mod chord;
pub mod drums;
pub mod pulse;

pub use arpeggio::{ArpeggioPlayer, Direction};
pub use chord::ChordPlayer;
pub use drums::DrumPlayer;
pub use pulse::PulsePlayer;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::Player;
use crate::error::{GrilleError, Result};
use crate::sequencing::{Duration, Pattern};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerSpec {
    Chord {
        name: Option<String>,
        /// Strike interval; one bar when omitted
        step: Option<String>,
        octave: Option<u8>,
        velocity: Option<u8>,
        channel: Option<u8>,
        /// MIDI program selected before the first strike
        program: Option<u8>,
    },
    Arpeggio {
        name: Option<String>,
        #[serde(default)]
        direction: Direction,
        step: Option<String>,
        octave: Option<u8>,
        velocity: Option<u8>,
        channel: Option<u8>,
    },
    #[serde(alias = "drum")]
    Drums {
        name: Option<String>,
        pattern: String,
        channel: Option<u8>,
    },
    #[serde(alias = "click", alias = "metronome")]
    Pulse {
        name: Option<String>,
        velocity: Option<u8>,
        channel: Option<u8>,
    },
}

impl PlayerSpec {
    /// Build the player, filling unset values from `config`.
    pub fn build(&self, config: &Config) -> Result<Box<dyn Player>> {
        let player: Box<dyn Player> = match self {
            PlayerSpec::Chord {
                name,
                step,
                octave,
                velocity,
                channel,
                program,
            } => {
                let mut player = ChordPlayer::new(name.as_deref().unwrap_or("chord"))
                    .octave(octave.unwrap_or(config.octave))
                    .velocity(velocity.unwrap_or(config.velocity))
                    .channel(channel.unwrap_or(config.channel));
                if let Some(step) = step {
                    player = player.step(parse_step(step)?);
                }
                if let Some(program) = program {
                    player = player.program(*program);
                }
                Box::new(player)
            }
            PlayerSpec::Arpeggio {
                name,
                direction,
                step,
                octave,
                velocity,
                channel,
            } => {
                let mut player =
                    ArpeggioPlayer::new(name.as_deref().unwrap_or("arpeggio"), *direction)
                        .octave(octave.unwrap_or(config.octave))
                        .velocity(velocity.unwrap_or(config.velocity))
                        .channel(channel.unwrap_or(config.channel));
                if let Some(step) = step {
                    player = player.step(parse_step(step)?);
                }
                Box::new(player)
            }
            PlayerSpec::Drums {
                name,
                pattern,
                channel,
            } => {
                let pattern: Pattern = pattern.parse()?;
                let mut player = DrumPlayer::new(name.as_deref().unwrap_or("drums"), pattern);
                if let Some(channel) = channel {
                    player = player.channel(*channel);
                }
                Box::new(player)
            }
            PlayerSpec::Pulse {
                name,
                velocity,
                channel,
            } => {
                let mut player = PulsePlayer::new(name.as_deref().unwrap_or("pulse"));
                if let Some(velocity) = velocity {
                    player = player.velocity(*velocity);
                }
                if let Some(channel) = channel {
                    player = player.channel(*channel);
                }
                Box::new(player)
            }
        };
        Ok(player)
    }
}

fn parse_step(text: &str) -> Result<Duration> {
    let step = Duration::parse(text)?;
    if !step.is_positive() {
        return Err(GrilleError::InvalidStep(text.to_string()));
    }
    Ok(step)
}
