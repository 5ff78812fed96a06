// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use siggen_waveform::{WaveformCache, WaveformShape, synthesize};
use std::hint::black_box;

const DUTY_SWEEP: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

fn bench_duty_sweep(c: &mut Criterion) {
    let lengths = [1024, 16384];

    let mut group = c.benchmark_group("duty_sweep");

    for len in lengths {
        group.bench_with_input(BenchmarkId::new("synthesize", len), &len, |b, &len| {
            b.iter(|| {
                for duty in DUTY_SWEEP {
                    black_box(synthesize(WaveformShape::Sawtooth, duty, len));
                }
            });
        });

        let mut cache = WaveformCache::new(len, DUTY_SWEEP.len());
        group.bench_with_input(BenchmarkId::new("cached", len), &len, |b, _| {
            b.iter(|| {
                for duty in DUTY_SWEEP {
                    black_box(cache.get_or_synthesize(WaveformShape::Sawtooth, duty));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_duty_sweep);
criterion_main!(benches);
