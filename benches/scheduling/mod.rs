//! Benchmarks for the player merge.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use grille::engine::Scheduler;
use grille::grid::{GridBuilder, HarmonyFields, Progression};
use grille::players::{ArpeggioPlayer, ChordPlayer, Direction, DrumPlayer, PulsePlayer};
use grille::Config;

use crate::GRID_SIZES;

fn scheduler(chords: usize) -> Scheduler {
    let degrees = ["I", "VI", "II", "V"];
    let progression: Vec<&str> = degrees.iter().copied().cycle().take(chords).collect();
    let fields: HarmonyFields = format!("p={}", progression.join(",")).parse().unwrap();
    let grid = GridBuilder::new(&Config::default())
        .unwrap()
        .build(&[fields])
        .unwrap();

    Scheduler::new(Progression::new(grid).unwrap())
        .with_player(ChordPlayer::new("pad"))
        .with_player(ArpeggioPlayer::new("arp", Direction::UpDown))
        .with_player(DrumPlayer::new("kit", "k [h h] s [h h]".parse().unwrap()))
        .with_player(PulsePlayer::new("click"))
}

pub fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduling/merge");

    for &size in GRID_SIZES {
        group.bench_with_input(BenchmarkId::new("four_players", size), &size, |b, &size| {
            b.iter_batched(
                || scheduler(size),
                |scheduler| {
                    for item in scheduler {
                        black_box(item.unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
