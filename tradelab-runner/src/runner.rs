//! Backtest orchestration: config + bars in, result out.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tradelab_core::domain::{Bar, EquityPoint, Trade};
use tradelab_core::engine::{run_replay, PerformanceMetrics};
use tradelab_core::risk::RiskReport;

use crate::config::BacktestConfig;
use crate::monitor::{MonitorSummary, TradingMonitor};
use crate::report;

/// Everything one run produced, ready for rendering or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: String,
    pub symbol: String,
    pub strategy: String,
    pub bar_count: usize,
    pub signal_count: usize,
    pub final_equity: f64,
    pub metrics: Option<PerformanceMetrics>,
    pub risk_report: RiskReport,
    pub monitor: MonitorSummary,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    /// Full text report: performance section when there were trades, then
    /// the risk and monitoring section.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        match &self.metrics {
            Some(metrics) => {
                out.push_str(&report::performance_report(
                    metrics,
                    &self.symbol,
                    &self.strategy,
                ));
            }
            None => {
                out.push_str(&format!(
                    "No trades executed over {} bars ({} on {}).\n",
                    self.bar_count, self.strategy, self.symbol
                ));
            }
        }
        out.push('\n');
        out.push_str(&report::daily_report(&self.monitor, &self.risk_report));
        out
    }
}

/// Run one backtest described by `config` over `bars`.
pub fn run_backtest(config: &BacktestConfig, bars: &[Bar]) -> anyhow::Result<BacktestResult> {
    for warning in config.validate_warnings() {
        tracing::warn!(%warning, "config warning");
    }

    let mut strategy = config.strategy.build();
    let mut monitor = TradingMonitor::new(config.monitor.clone());
    let replay_config = config.replay_config();

    tracing::info!(
        run_id = %config.run_id(),
        symbol = %replay_config.symbol,
        strategy = strategy.name(),
        bars = bars.len(),
        "starting backtest"
    );

    let result = run_replay(bars, strategy.as_mut(), &replay_config, &mut monitor)
        .context("replay failed")?;

    Ok(BacktestResult {
        run_id: config.run_id(),
        symbol: replay_config.symbol,
        strategy: config.strategy.name().to_string(),
        bar_count: result.bar_count,
        signal_count: result.signal_count,
        final_equity: result.final_equity,
        metrics: result.metrics,
        risk_report: result.risk_report,
        monitor: monitor.summary(),
        trades: result.trades,
        equity_curve: result.equity_curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_oscillating;

    fn config(kind: &str) -> BacktestConfig {
        BacktestConfig::from_toml(&format!(
            r#"
            [backtest]
            symbol = "BTC/USDT"

            [strategy]
            kind = "{kind}"
            "#
        ))
        .unwrap()
    }

    #[test]
    fn oscillating_market_runs_end_to_end() {
        let bars = synthetic_oscillating(400, 11);
        let result = run_backtest(&config("grid_trading"), &bars).unwrap();
        assert_eq!(result.bar_count, 400);
        assert_eq!(result.run_id.len(), 16);
        assert_eq!(result.strategy, "grid_trading");
        assert_eq!(result.equity_curve.len(), 400);
        assert_eq!(
            result.monitor.trades_executed as usize,
            result.trades.len()
        );
        assert!(result.render_report().contains("Risk & Monitoring"));
    }

    #[test]
    fn same_config_and_data_give_identical_results() {
        let bars = synthetic_oscillating(300, 3);
        let first = run_backtest(&config("rsi_reversion"), &bars).unwrap();
        let second = run_backtest(&config("rsi_reversion"), &bars).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn report_handles_tradeless_runs() {
        let bars = synthetic_oscillating(50, 1);
        // 50 bars is below every bundled strategy's warmup.
        let result = run_backtest(&config("ma_crossover"), &bars).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.render_report().contains("No trades executed"));
    }
}
