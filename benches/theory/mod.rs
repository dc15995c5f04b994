//! Benchmarks for chord construction and time arithmetic.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use grille::sequencing::{Duration, TimeSection, TimeSignature};
use grille::theory::{Chord, Degree, Scale};

pub fn bench_chords(c: &mut Criterion) {
    let mut group = c.benchmark_group("theory/chords");
    let scale: Scale = "C_major".parse().unwrap();

    group.bench_function("diatonic_sevenths", |b| {
        b.iter(|| black_box(&scale).diatonic_sevenths().unwrap())
    });

    group.bench_function("secondary_dominant", |b| {
        let degree: Degree = "V/V".parse().unwrap();
        b.iter(|| {
            Chord::builder()
                .degree(black_box(degree))
                .scale(&scale)
                .inversion(1)
                .build()
                .unwrap()
        })
    });

    group.bench_function("parse_symbol", |b| {
        b.iter(|| black_box("F#4min7").parse::<Chord>().unwrap())
    });

    group.finish();
}

pub fn bench_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("theory/sections");

    for ts in [TimeSignature::FOUR_FOUR, TimeSignature::SIX_EIGHT] {
        let offsets: Vec<Duration> = (0..256)
            .map(|i| Duration::new(i, 3).unwrap())
            .collect();
        group.bench_with_input(BenchmarkId::new("round_trip", ts), &ts, |b, ts| {
            b.iter(|| {
                for offset in &offsets {
                    let section = TimeSection::from_duration(ts, *offset).unwrap();
                    black_box(section.to_duration(ts));
                }
            })
        });
    }

    group.finish();
}
