//! Backtest engine: execution accounting, metrics, and the replay loop.

pub mod accounting;
pub mod metrics;
pub mod replay;

pub use accounting::{BacktestEngine, Execution};
pub use metrics::PerformanceMetrics;
pub use replay::{run_replay, ReplayConfig, ReplayError, RunResult};
