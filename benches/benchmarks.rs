use criterion::{black_box, criterion_group, criterion_main, Criterion};
use idx_trade_engine::prelude::*;

fn benchmark_tick_lookup(c: &mut Criterion) {
    c.bench_function("tick_size_10000", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..10_000u32 {
                sum += u64::from(tick_size(black_box(f64::from(i))));
            }
            sum
        });
    });
}

fn benchmark_ladder_generation(c: &mut Criterion) {
    let generator = LadderGenerator::new(BoardType::Regular, 30);
    c.bench_function("ladder_regular_30_steps", |b| {
        b.iter(|| generator.generate(black_box(975.0)));
    });

    let generator = LadderGenerator::new(BoardType::Accelerated, 30);
    c.bench_function("ladder_accelerated_30_steps", |b| {
        b.iter(|| generator.generate(black_box(8.0)));
    });
}

fn benchmark_aggregate(c: &mut Criterion) {
    let fees = FeeSchedule::stockbit();
    let positions: Vec<Position> = (0..1_000u32)
        .map(|i| {
            let buy = f64::from(100 + i);
            Position::new(format!("S{}", i), 10 + u64::from(i % 50), buy, buy * 1.1, fees)
        })
        .collect();

    c.bench_function("aggregate_1000_positions", |b| {
        b.iter(|| aggregate(black_box(&positions)));
    });
}

criterion_group!(
    benches,
    benchmark_tick_lookup,
    benchmark_ladder_generation,
    benchmark_aggregate
);
criterion_main!(benches);
