//! Deterministic single-threaded replay of a bar series.
//!
//! The replay owns the wiring between strategy, risk manager, and engine.
//! Per bar: strategy decision, risk gate and sizing, execution, risk
//! bookkeeping, equity sample, balance sync with day rollover, then events
//! to the sink. Identical inputs give identical outputs; nothing here reads
//! the wall clock or any global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chrono::NaiveDateTime;

use crate::domain::{Bar, EquityPoint, Trade};
use crate::engine::accounting::{BacktestEngine, Execution};
use crate::engine::metrics::PerformanceMetrics;
use crate::events::{EngineEvent, EventSink};
use crate::risk::{ConfigError, PositionSide, RiskConfig, RiskManager, RiskReport};
use crate::strategy::{Signal, SignalDecision, Strategy};

/// Parameters for one replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub symbol: String,
    pub initial_capital: f64,
    /// Fractional commission per fill.
    pub commission: f64,
    /// Fractional slippage per fill.
    pub slippage: f64,
    pub risk: RiskConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            initial_capital: 10_000.0,
            commission: 0.001,
            slippage: 0.0005,
            risk: RiskConfig::default(),
        }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<(), ReplayError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ReplayError::InvalidParameter {
                name: "initial_capital",
                value: self.initial_capital,
            });
        }
        for (name, value) in [("commission", self.commission), ("slippage", self.slippage)] {
            if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                return Err(ReplayError::InvalidParameter { name, value });
            }
        }
        self.risk.validate()?;
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ReplayError {
    #[error("{name} out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("risk config invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("bar {index} not after its predecessor ({previous} -> {current})")]
    OutOfOrder {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("bar {index} has malformed OHLCV values")]
    MalformedBar { index: usize },
}

/// Everything a finished replay produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// `None` when the run recorded no trades.
    pub metrics: Option<PerformanceMetrics>,
    pub final_equity: f64,
    pub bar_count: usize,
    /// Non-hold decisions the strategy emitted.
    pub signal_count: usize,
    pub risk_report: RiskReport,
}

/// Replay `bars` through `strategy` under `config`, reporting to `sink`.
///
/// Bar validation is up front and fatal: any malformed bar or non-increasing
/// timestamp fails the whole run before a single trade. An empty series is
/// a valid run with empty history.
pub fn run_replay(
    bars: &[Bar],
    strategy: &mut dyn Strategy,
    config: &ReplayConfig,
    sink: &mut dyn EventSink,
) -> Result<RunResult, ReplayError> {
    config.validate()?;
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(ReplayError::MalformedBar { index });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(ReplayError::OutOfOrder {
                index,
                previous: bars[index - 1].timestamp,
                current: bar.timestamp,
            });
        }
    }

    let mut engine = BacktestEngine::new(config.initial_capital, config.commission, config.slippage);
    let mut risk = RiskManager::new(config.risk.clone());
    risk.initialize(config.initial_capital);

    let min_history = strategy.min_history();
    let mut signal_count = 0usize;

    for (index, bar) in bars.iter().enumerate() {
        let tripped_at_bar_start = risk.breaker().is_tripped();
        let price = bar.close;

        let decision = if index + 1 >= min_history {
            strategy.generate_signal(&bars[..=index])
        } else {
            SignalDecision::hold()
        };
        if decision.signal != Signal::Hold {
            signal_count += 1;
        }

        match decision.signal {
            Signal::Long if engine.is_flat() => match risk.check_trade_allowed() {
                Err(denied) => {
                    sink.on_event(&EngineEvent::RiskDenied {
                        symbol: config.symbol.clone(),
                        timestamp: bar.timestamp,
                        reason: denied.to_string(),
                    });
                }
                Ok(()) => {
                    let size = risk.calculate_position_size(price, decision.strength);
                    if size.quantity > 0.0 {
                        match engine.execute(bar.timestamp, Signal::Long, price, size.quantity) {
                            Execution::Entered(trade) => {
                                risk.add_position(
                                    &config.symbol,
                                    trade.quantity,
                                    trade.price,
                                    PositionSide::Long,
                                );
                                sink.on_event(&EngineEvent::TradeExecuted {
                                    symbol: config.symbol.clone(),
                                    trade,
                                });
                            }
                            Execution::InsufficientFunds {
                                required,
                                available,
                            } => {
                                sink.on_event(&EngineEvent::InsufficientFunds {
                                    symbol: config.symbol.clone(),
                                    timestamp: bar.timestamp,
                                    required,
                                    available,
                                });
                            }
                            _ => {}
                        }
                    }
                }
            },
            Signal::Close => {
                if let Execution::Exited(trade) =
                    engine.execute(bar.timestamp, Signal::Close, price, 0.0)
                {
                    risk.remove_position(&config.symbol);
                    risk.record_trade_result(trade.pnl.unwrap_or(0.0));
                    sink.on_event(&EngineEvent::TradeExecuted {
                        symbol: config.symbol.clone(),
                        trade,
                    });
                }
            }
            _ => {}
        }

        let point = engine.update_equity(bar);
        // The account value the risk manager tracks is mark-to-market, so
        // cash deployed into the open position does not read as a loss.
        risk.update_balance(point.total_equity, Some(point.total_equity), bar.date());

        if !tripped_at_bar_start {
            if let Some(reason) = risk.breaker().reason() {
                sink.on_event(&EngineEvent::BreakerTripped {
                    timestamp: bar.timestamp,
                    reason,
                });
            }
        }

        sink.on_risk_report(&risk.report());
    }

    let final_equity = engine
        .equity_curve()
        .last()
        .map_or(config.initial_capital, |p| p.total_equity);
    Ok(RunResult {
        metrics: engine.performance(),
        final_equity,
        bar_count: bars.len(),
        signal_count,
        risk_report: risk.report(),
        trades: engine.trades().to_vec(),
        equity_curve: engine.equity_curve().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullSink, RecordingSink};
    use chrono::{Duration, NaiveDate};

    /// Plays back a fixed per-bar script, indexed by history length.
    struct Scripted {
        script: Vec<Signal>,
        min: usize,
    }

    impl Scripted {
        fn new(script: Vec<Signal>) -> Self {
            Self { script, min: 1 }
        }
    }

    impl Strategy for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn min_history(&self) -> usize {
            self.min
        }

        fn generate_signal(&mut self, history: &[Bar]) -> SignalDecision {
            let signal = self
                .script
                .get(history.len() - 1)
                .copied()
                .unwrap_or(Signal::Hold);
            SignalDecision::new(signal, 1.0)
        }
    }

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: base + Duration::hours(i as i64),
                open: *c,
                high: c * 1.01,
                low: c * 0.99,
                close: *c,
                volume: 1.0,
            })
            .collect()
    }

    fn config() -> ReplayConfig {
        ReplayConfig::default()
    }

    #[test]
    fn round_trip_records_trades_and_metrics() {
        let series = bars(&[100.0, 100.0, 110.0, 110.0]);
        let mut strat = Scripted::new(vec![
            Signal::Hold,
            Signal::Long,
            Signal::Close,
            Signal::Hold,
        ]);
        let mut sink = RecordingSink::default();
        let result = run_replay(&series, &mut strat, &config(), &mut sink).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.equity_curve.len(), 4);
        assert_eq!(result.bar_count, 4);
        assert_eq!(result.signal_count, 2);
        let metrics = result.metrics.unwrap();
        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.winning_trades, 1);
        assert!(result.final_equity > 10_000.0);

        let trades: Vec<_> = sink
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::TradeExecuted { .. }))
            .collect();
        assert_eq!(trades.len(), 2);
        assert_eq!(sink.reports.len(), 4);
    }

    #[test]
    fn empty_series_is_a_valid_empty_run() {
        let mut strat = Scripted::new(vec![]);
        let result = run_replay(&[], &mut strat, &config(), &mut NullSink).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.equity_curve.is_empty());
        assert!(result.metrics.is_none());
        assert_eq!(result.final_equity, 10_000.0);
    }

    #[test]
    fn out_of_order_bars_fail_before_trading() {
        let mut series = bars(&[100.0, 101.0, 102.0]);
        series[2].timestamp = series[0].timestamp;
        let mut strat = Scripted::new(vec![Signal::Long]);
        let err = run_replay(&series, &mut strat, &config(), &mut NullSink).unwrap_err();
        assert!(matches!(err, ReplayError::OutOfOrder { index: 2, .. }));
    }

    #[test]
    fn malformed_bar_fails_before_trading() {
        let mut series = bars(&[100.0, 101.0]);
        series[1].low = f64::NAN;
        let mut strat = Scripted::new(vec![Signal::Long]);
        let err = run_replay(&series, &mut strat, &config(), &mut NullSink).unwrap_err();
        assert_eq!(err, ReplayError::MalformedBar { index: 1 });
    }

    #[test]
    fn strategy_not_consulted_before_min_history() {
        let series = bars(&[100.0, 100.0, 100.0, 100.0]);
        let mut strat = Scripted::new(vec![Signal::Long; 4]);
        strat.min = 3;
        let mut sink = RecordingSink::default();
        let result = run_replay(&series, &mut strat, &config(), &mut sink).unwrap();
        // First consult at the third bar; one entry, no exit.
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].timestamp, series[2].timestamp);
        assert_eq!(result.signal_count, 2);
    }

    #[test]
    fn emergency_stop_denies_every_entry() {
        let series = bars(&[100.0, 100.0, 100.0]);
        let mut strat = Scripted::new(vec![Signal::Long; 3]);
        let mut cfg = config();
        cfg.risk.emergency_stop = true;
        let mut sink = RecordingSink::default();
        let result = run_replay(&series, &mut strat, &cfg, &mut sink).unwrap();
        assert!(result.trades.is_empty());
        let denials = sink
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::RiskDenied { .. }))
            .count();
        assert_eq!(denials, 3);
    }

    #[test]
    fn losing_streak_trips_breaker_once() {
        // Three entry/exit pairs, each exiting lower than it entered.
        let series = bars(&[
            100.0, 90.0, 100.0, 90.0, 100.0, 90.0, 100.0, 100.0,
        ]);
        let script = vec![
            Signal::Long,
            Signal::Close,
            Signal::Long,
            Signal::Close,
            Signal::Long,
            Signal::Close,
            Signal::Long,
            Signal::Long,
        ];
        let mut strat = Scripted::new(script);
        let mut sink = RecordingSink::default();
        let result = run_replay(&series, &mut strat, &config(), &mut sink).unwrap();

        assert!(result.risk_report.circuit_breaker_tripped);
        let trips: Vec<_> = sink
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::BreakerTripped { .. }))
            .collect();
        assert_eq!(trips.len(), 1);
        // Entries after the trip are denied, not executed.
        assert_eq!(result.trades.len(), 6);
        let denials = sink
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::RiskDenied { .. }))
            .count();
        assert_eq!(denials, 2);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut cfg = config();
        cfg.commission = 1.5;
        let mut strat = Scripted::new(vec![]);
        let err = run_replay(&bars(&[100.0]), &mut strat, &cfg, &mut NullSink).unwrap_err();
        assert_eq!(
            err,
            ReplayError::InvalidParameter {
                name: "commission",
                value: 1.5
            }
        );

        let mut cfg = config();
        cfg.risk.max_daily_loss = 2.0;
        let err = run_replay(&bars(&[100.0]), &mut strat, &cfg, &mut NullSink).unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }

    #[test]
    fn identical_inputs_replay_identically() {
        let series = bars(&[100.0, 95.0, 105.0, 98.0, 110.0, 102.0]);
        let script = vec![
            Signal::Long,
            Signal::Close,
            Signal::Long,
            Signal::Close,
            Signal::Long,
            Signal::Close,
        ];
        let mut a = Scripted::new(script.clone());
        let mut b = Scripted::new(script);
        let first = run_replay(&series, &mut a, &config(), &mut NullSink).unwrap();
        let second = run_replay(&series, &mut b, &config(), &mut NullSink).unwrap();
        assert_eq!(first, second);
    }
}
