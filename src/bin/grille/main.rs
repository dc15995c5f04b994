//! grille - play a chord grid
//!
//! Run with: cargo run -- song.toml

mod args;
mod song;

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::Args;
use grille::io::{LogSink, OutputWorker};
use grille::runtime::{ManualClock, Playback};
use grille::Config;
use song::Song;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grille=info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    config.repeat |= args.repeat;
    check_dry_run(&config, args.dry_run)?;

    let song = Song::load(&args.song)?;
    tracing::info!(title = song.title.as_deref().unwrap_or("untitled"), "loaded song");
    let scheduler = song.scheduler(&config)?;

    if args.dry_run {
        let report = Playback::with_clock(config.ppq, ManualClock::new())
            .unpaced()
            .run(scheduler, &mut LogSink)?;
        tracing::info!(events = report.events, seconds = report.seconds, "dry run done");
        return Ok(());
    }

    let (mut queue, worker) = OutputWorker::spawn(config.queue_capacity, LogSink)?;
    let played = Playback::new(config.ppq).run(scheduler, &mut queue);
    drop(queue);
    worker.join()?;
    played?;
    Ok(())
}

/// A dry run renders unpaced, so it has to reach the end of the progression.
fn check_dry_run(config: &Config, dry_run: bool) -> color_eyre::Result<()> {
    if dry_run && (config.repeat || config.chord_loop) {
        bail!("--dry-run cannot be combined with repeat or chord_loop: the schedule would never end");
    }
    Ok(())
}
