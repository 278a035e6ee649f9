//! Full pipeline: config file -> CSV data -> replay -> report -> artifacts.

use std::io::Write;

use tradelab_runner::{load_bars_csv, run_backtest, synthetic_trending, BacktestConfig};

const CONFIG: &str = r#"
[backtest]
symbol = "BTC/USDT"
initial_capital = 25000.0
commission = 0.001
slippage = 0.0005

[strategy]
kind = "ma_crossover"
fast_period = 8
slow_period = 21
ma_type = "ema"

[risk]
max_position_size = 0.15
max_consecutive_losses = 4

[monitor]
daily_loss_alert_pct = 2.5
"#;

#[test]
fn config_file_to_artifacts() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file.write_all(CONFIG.as_bytes()).unwrap();
    config_file.flush().unwrap();

    let config = BacktestConfig::from_file(config_file.path()).unwrap();
    assert_eq!(config.backtest.initial_capital, 25_000.0);
    assert_eq!(config.risk.max_position_size, 0.15);
    assert_eq!(config.monitor.daily_loss_alert_pct, 2.5);

    // Round-trip the bar series through CSV before replaying it.
    let bars = synthetic_trending(400, 99);
    let mut data_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(data_file, "timestamp,open,high,low,close,volume").unwrap();
    for bar in &bars {
        writeln!(
            data_file,
            "{},{},{},{},{},{}",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )
        .unwrap();
    }
    data_file.flush().unwrap();
    let loaded = load_bars_csv(data_file.path()).unwrap();
    assert_eq!(loaded.len(), bars.len());

    let result = run_backtest(&config, &loaded).unwrap();
    assert_eq!(result.symbol, "BTC/USDT");
    assert_eq!(result.bar_count, 400);
    assert!(result.risk_report.initialized);

    let out = tempfile::tempdir().unwrap();
    let dir = tradelab_runner::export::save_artifacts(&result, out.path()).unwrap();
    assert!(dir.join("metrics.json").is_file());

    let report = result.render_report();
    assert!(report.contains("Risk & Monitoring"));
}

#[test]
fn rerunning_the_same_file_reuses_the_run_id() {
    let config_a = BacktestConfig::from_toml(CONFIG).unwrap();
    let config_b = BacktestConfig::from_toml(CONFIG).unwrap();
    assert_eq!(config_a.run_id(), config_b.run_id());
}
