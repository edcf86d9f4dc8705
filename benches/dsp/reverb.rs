//! Benchmarks for the freeverb reverberator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nalgebra::DVector;
use patina_dsp::fx::{make_freeverb, FreeverbParams};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("fx/freeverb");

    for &size in BLOCK_SIZES {
        // Impulse-like attack with a quiet tail.
        let input: Vec<f64> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f64 / 10.0)
                } else {
                    (i as f64 * 0.05).sin() * 0.1
                }
            })
            .collect();

        let mut reverb = make_freeverb(&FreeverbParams::default());
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    let frame = DVector::from_vec(vec![sample, sample]);
                    let out = reverb.advance(black_box(&frame));
                    sum += out[0] + out[1];
                }
                sum
            })
        });

        // Heavier damping shortens the tail without changing the topology.
        let mut dark = make_freeverb(&FreeverbParams {
            damp: 0.6,
            ..FreeverbParams::default()
        });
        group.bench_with_input(BenchmarkId::new("dark", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    let frame = DVector::from_vec(vec![sample, sample]);
                    let out = dark.advance(black_box(&frame));
                    sum += out[0] + out[1];
                }
                sum
            })
        });
    }

    group.finish();
}
