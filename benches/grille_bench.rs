//! Benchmarks for grid construction and scheduling.
//!
//! Run with: cargo bench
//!
//! Benchmark groups:
//!   - theory/*      Chord building and time-section sweeps
//!   - scheduling/*  Multi-player merges over whole grids

use criterion::{criterion_group, criterion_main};

mod scheduling;
mod theory;

/// Number of chords in the benchmarked progressions.
pub const GRID_SIZES: &[usize] = &[8, 32, 128];

criterion_group!(
    benches,
    theory::bench_chords,
    theory::bench_sections,
    scheduling::bench_merge,
);
criterion_main!(benches);
