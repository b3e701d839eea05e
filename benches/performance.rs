//! Performance benchmarks for the signal engine
//!
//! Run with: `cargo bench`
//! View results: `open target/criterion/report/index.html`

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use breakout_trader::indicators::{atr, ema};
use breakout_trader::strategies::three_bar_breakout::{
    ThreeBarBreakoutConfig, ThreeBarBreakoutStrategy,
};
use breakout_trader::strategies::Strategy;
use breakout_trader::Candle;

fn synthetic_candles(count: usize) -> Vec<Candle> {
    let start = Utc::now() - Duration::minutes(count as i64);
    (0..count)
        .map(|i| {
            let mid = 30_000.0 + (i as f64 * 0.1).sin() * 50.0;
            Candle::new_unchecked(
                start + Duration::minutes(i as i64),
                mid - 2.0,
                mid + 6.0,
                mid - 6.0,
                mid + 2.0,
                10.0,
            )
        })
        .collect()
}

fn benchmark_indicators(c: &mut Criterion) {
    let candles = synthetic_candles(1000);
    let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let close: Vec<f64> = candles.iter().map(|c| c.close).collect();

    c.bench_function("ema_200_x1000", |b| b.iter(|| ema(black_box(&close), 200)));
    c.bench_function("atr_14_x1000", |b| {
        b.iter(|| atr(black_box(&high), black_box(&low), black_box(&close), 14))
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let candles = synthetic_candles(300);
    let strategy = ThreeBarBreakoutStrategy::new(ThreeBarBreakoutConfig::default());

    c.bench_function("evaluate_latest_x300", |b| {
        b.iter(|| strategy.evaluate_latest(black_box(&candles)))
    });
}

criterion_group!(benches, benchmark_indicators, benchmark_evaluate);
criterion_main!(benches);
