//! End-to-end replays of the bundled strategies over synthetic series.

use chrono::{Duration, NaiveDate};
use tradelab_core::domain::{Bar, TradeSide};
use tradelab_core::engine::{run_replay, ReplayConfig, RunResult};
use tradelab_core::events::RecordingSink;
use tradelab_core::strategy::{GridTrading, MaCrossover, MaType, RsiReversion, Strategy};

fn series(n: usize, f: impl Fn(usize) -> f64) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = f(i);
            Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close,
                high: close * 1.002,
                low: close * 0.998,
                close,
                volume: 50.0,
            }
        })
        .collect()
}

/// Invariants every well-formed run satisfies, whatever the strategy did.
fn assert_run_invariants(result: &RunResult, bars: usize, initial_capital: f64) {
    assert_eq!(result.bar_count, bars);
    assert_eq!(result.equity_curve.len(), bars);

    // Fills strictly alternate entry/exit, starting with an entry.
    for (i, trade) in result.trades.iter().enumerate() {
        let expected = if i % 2 == 0 {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        assert_eq!(trade.side, expected, "trade {i} out of sequence");
        assert!(trade.fee >= 0.0);
        assert!(trade.quantity > 0.0);
        assert!(trade.cash_after >= 0.0, "cash went negative at trade {i}");
    }

    // Equity identity holds at every sample.
    for point in &result.equity_curve {
        assert!((point.total_equity - (point.cash + point.position_value)).abs() < 1e-6);
    }

    if let Some(metrics) = &result.metrics {
        assert_eq!(
            metrics.winning_trades + metrics.losing_trades,
            metrics.total_trades
        );
        assert!((metrics.final_capital - result.final_equity).abs() < 1e-6);
        assert!((-100.0..=0.0).contains(&metrics.max_drawdown));
        assert!((metrics.total_return - (result.final_equity - initial_capital)).abs() < 1e-6);
    }
}

#[test]
fn ma_crossover_trades_a_cyclic_market() {
    let bars = series(300, |i| 100.0 + 10.0 * (i as f64 / 10.0).sin() + i as f64 * 0.02);
    let mut strat = MaCrossover::new(10, 30, MaType::Sma);
    let config = ReplayConfig::default();
    let mut sink = RecordingSink::default();

    let result = run_replay(&bars, &mut strat, &config, &mut sink).unwrap();
    assert_run_invariants(&result, 300, config.initial_capital);
    assert!(result.signal_count > 0, "no crossovers found in a cyclic series");
    assert!(!result.trades.is_empty());
    assert_eq!(sink.reports.len(), 300);
}

#[test]
fn rsi_reversion_buys_selloffs() {
    // Slow oscillation: long descending stretches push RSI deep.
    let bars = series(300, |i| 100.0 + 20.0 * (i as f64 / 25.0).sin());
    let mut strat = RsiReversion::default();
    let config = ReplayConfig::default();
    let mut sink = RecordingSink::default();

    let result = run_replay(&bars, &mut strat, &config, &mut sink).unwrap();
    assert_run_invariants(&result, 300, config.initial_capital);
    assert!(result.signal_count > 0);
}

#[test]
fn grid_trading_works_a_range() {
    let bars = series(300, |i| 100.0 + 6.0 * (i as f64 / 7.0).sin());
    let mut strat = GridTrading::default();
    let config = ReplayConfig::default();
    let mut sink = RecordingSink::default();

    let result = run_replay(&bars, &mut strat, &config, &mut sink).unwrap();
    assert_run_invariants(&result, 300, config.initial_capital);
}

#[test]
fn flat_market_produces_no_trades() {
    let bars = series(150, |_| 100.0);
    let mut strat = MaCrossover::new(10, 30, MaType::Sma);
    let config = ReplayConfig::default();
    let mut sink = RecordingSink::default();

    let result = run_replay(&bars, &mut strat, &config, &mut sink).unwrap();
    assert!(result.trades.is_empty());
    assert!(result.metrics.is_none());
    assert_eq!(result.final_equity, config.initial_capital);
}

#[test]
fn replays_are_reproducible_across_strategies() {
    let bars = series(250, |i| 100.0 + 8.0 * (i as f64 / 9.0).sin());
    let config = ReplayConfig::default();

    let mut first_sink = RecordingSink::default();
    let mut second_sink = RecordingSink::default();
    let mut a: Box<dyn Strategy> = Box::new(GridTrading::default());
    let mut b: Box<dyn Strategy> = Box::new(GridTrading::default());

    let first = run_replay(&bars, a.as_mut(), &config, &mut first_sink).unwrap();
    let second = run_replay(&bars, b.as_mut(), &config, &mut second_sink).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_sink.events, second_sink.events);
}
