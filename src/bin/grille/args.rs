use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "grille")]
#[command(about = "Play a chord grid through a set of players")]
pub struct Args {
    /// Song file with [[harmony]] and [[player]] tables
    pub song: PathBuf,

    /// Session defaults (tempo, scale, ppq, ...)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the whole schedule at once instead of playing in real time
    #[arg(long)]
    pub dry_run: bool,

    /// Start over after the last chord
    #[arg(long)]
    pub repeat: bool,
}
