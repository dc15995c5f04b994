//! Song files
//!
//! ```toml
//! title = "Turnaround"
//!
//! [[harmony]]
//! sc = "C_major"
//! p = "II, V, I"
//!
//! [[harmony]]
//! bpm = 90
//! ts = "3/4"
//! p = ["IV", { degree = "V", d = "H" }]
//!
//! [[player]]
//! kind = "chord"
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

use grille::engine::Scheduler;
use grille::grid::{GridBuilder, HarmonyFields, Progression};
use grille::players::PlayerSpec;
use grille::Config;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Song {
    pub title: Option<String>,
    pub harmony: Vec<HarmonyFields>,
    #[serde(default)]
    pub player: Vec<PlayerSpec>,
}

impl Song {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading song {}", path.display()))?;
        toml::from_str(&text).wrap_err_with(|| format!("parsing song {}", path.display()))
    }

    /// Grid and players, ready to play. A song without players gets a
    /// plain chord player.
    pub fn scheduler(&self, config: &Config) -> Result<Scheduler> {
        let grid = GridBuilder::new(config)?.build(&self.harmony)?;
        let mut progression = Progression::new(grid)?;
        progression.set_chord_loop(config.chord_loop);

        let mut scheduler = Scheduler::new(progression).repeat(config.repeat);
        let specs = if self.player.is_empty() {
            vec![PlayerSpec::Chord {
                name: None,
                step: None,
                octave: None,
                velocity: None,
                channel: None,
                program: None,
            }]
        } else {
            self.player.clone()
        };
        for spec in &specs {
            scheduler.add_player(spec.build(config)?);
        }
        Ok(scheduler)
    }
}
