//! Benchmarks for the comb filter family.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patina_dsp::dsp::comb::{FeedforwardFeedbackComb, FilteredFeedbackComb};
use patina_dsp::Filter;

use crate::BLOCK_SIZES;

pub fn bench_comb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/comb");

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.05).sin()).collect();

        let mut allpass = FeedforwardFeedbackComb::allpass(0.5f64, 341);
        group.bench_with_input(BenchmarkId::new("allpass", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    sum += allpass.advance(black_box(sample));
                }
                sum
            })
        });

        let mut lbcf = FilteredFeedbackComb::new(0.672f64, 0.2, 1557);
        group.bench_with_input(BenchmarkId::new("filtered_feedback", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    sum += lbcf.advance(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
