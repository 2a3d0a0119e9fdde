use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use logisweep_core::*;

const TIERS: [(&str, GameConfig); 3] = [
    ("beginner", GameConfig::BEGINNER),
    ("intermediate", GameConfig::INTERMEDIATE),
    ("expert", GameConfig::EXPERT),
];

fn random_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_generation");
    for (name, config) in TIERS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                black_box(RandomMinefieldGenerator::new(seed).generate(config))
            });
        });
    }
    group.finish();
}

fn logical_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logical_generation");
    group.sample_size(10);
    for (name, config) in TIERS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                black_box(LogicalMinefieldGenerator::new(seed).search(config))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, random_generation, logical_generation);
criterion_main!(benches);
