use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use logisweep_core::*;

/// Boards with their opening exposed, ready for the solver.
fn openings(config: GameConfig, count: u64) -> Vec<PlayEngine> {
    (0..count)
        .map(|seed| {
            let board = LogicalMinefieldGenerator::new(seed).search(config).into_board();
            PlayEngine::from_board(board, LivesLedger::disabled())
        })
        .collect()
}

fn solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("logical_solve");
    for (name, config) in [
        ("beginner", GameConfig::BEGINNER),
        ("intermediate", GameConfig::INTERMEDIATE),
        ("expert", GameConfig::EXPERT),
    ] {
        let engines = openings(config, 8);
        group.bench_with_input(BenchmarkId::from_parameter(name), &engines, |b, engines| {
            b.iter_batched(
                || engines.clone(),
                |mut engines| {
                    for engine in &mut engines {
                        black_box(logical_solve(engine));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn deduce(c: &mut Criterion) {
    let engines = openings(GameConfig::EXPERT, 8);
    let observations: Vec<_> = engines.iter().map(Observation::from_engine).collect();

    c.bench_function("suggest_certain_mine/expert", |b| {
        b.iter(|| {
            for obs in &observations {
                black_box(suggest_certain_mine(obs));
            }
        });
    });
}

criterion_group!(benches, solve, deduce);
criterion_main!(benches);
