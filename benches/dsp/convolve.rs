//! Benchmarks for streaming frequency-domain convolution.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patina_dsp::dsp::convolve::OverlapAddConvolver;
use patina_dsp::dsp::oversample::{interpolation_fir, INTERP_FIR_TAPS, UP_FACTOR};
use patina_dsp::Filter;

use crate::BLOCK_SIZES;

pub fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolve");

    // The 769-tap interpolation lowpass is the heaviest filter the library
    // streams through this path.
    let filter = interpolation_fir::<f64>(INTERP_FIR_TAPS, UP_FACTOR);

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.05).sin()).collect();

        let mut convolver = OverlapAddConvolver::new(256, &filter);
        group.bench_with_input(BenchmarkId::new("overlap_add_769", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    sum += convolver.advance(black_box(sample));
                }
                sum
            })
        });

        let short_filter = [0.25f64, 0.5, 0.25];
        let mut short = OverlapAddConvolver::new(64, &short_filter);
        group.bench_with_input(BenchmarkId::new("overlap_add_3", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    sum += short.advance(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
