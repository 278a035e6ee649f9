use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tradelab_core::domain::Bar;
use tradelab_core::engine::{run_replay, ReplayConfig};
use tradelab_core::events::NullSink;
use tradelab_core::strategy::{GridTrading, MaCrossover, MaType, Strategy};

fn cyclic_series(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + 12.0 * (i as f64 / 11.0).sin() + i as f64 * 0.001;
            Bar {
                timestamp: base + Duration::minutes(i as i64),
                open: close,
                high: close * 1.002,
                low: close * 0.998,
                close,
                volume: 25.0,
            }
        })
        .collect()
}

fn bench_replay(c: &mut Criterion) {
    let bars = cyclic_series(10_000);
    let config = ReplayConfig::default();

    c.bench_function("replay_ma_crossover_10k_bars", |b| {
        b.iter(|| {
            let mut strat = MaCrossover::new(10, 30, MaType::Sma);
            run_replay(black_box(&bars), &mut strat, &config, &mut NullSink).unwrap()
        })
    });

    c.bench_function("replay_grid_10k_bars", |b| {
        b.iter(|| {
            let mut strat: Box<dyn Strategy> = Box::new(GridTrading::default());
            run_replay(black_box(&bars), strat.as_mut(), &config, &mut NullSink).unwrap()
        })
    });
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
