//! TradeLab Runner — configuration, data, orchestration, and reporting
//! around the core replay engine.

pub mod config;
pub mod data;
pub mod export;
pub mod monitor;
pub mod report;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, MonitorConfig, StrategyConfig};
pub use data::{load_bars_csv, synthetic_oscillating, synthetic_trending, DataError};
pub use monitor::{MonitorSummary, TradingMonitor};
pub use runner::{run_backtest, BacktestResult};
