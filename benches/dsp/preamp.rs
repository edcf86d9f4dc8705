//! Benchmarks for the oversampled tube pre-amp.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patina_dsp::dsp::filter::FirstOrderFilter;
use patina_dsp::dsp::saturate::tanh_sat;
use patina_dsp::fx::{TriodeClassAModel, TubePreAmpClassA};
use patina_dsp::Filter;

use crate::BLOCK_SIZES;

fn triode(invert: bool) -> TriodeClassAModel<f64> {
    TriodeClassAModel::new(
        Box::new(|x, k| tanh_sat(x, k)),
        2.0,
        1.0,
        Some(FirstOrderFilter::highpass(20.0, 48_000.0)),
        Some(FirstOrderFilter::low_shelf(80.0, 48_000.0, -3.0)),
        invert,
    )
}

pub fn bench_preamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("fx/preamp");
    // Each pre-amp sample runs four oversampled stages; keep sample counts
    // moderate.
    group.sample_size(20);

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.05).sin() * 0.8).collect();

        let mut amp = TubePreAmpClassA::new(
            -6.0,
            3.0,
            vec![triode(true)],
            vec![triode(false)],
            FirstOrderFilter::low_shelf(100.0, 48_000.0, -6.0),
            FirstOrderFilter::high_shelf(8_000.0, 48_000.0, 4.0),
        );
        group.bench_with_input(BenchmarkId::new("single_stage", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f64;
                for &sample in &input {
                    sum += amp.advance(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
