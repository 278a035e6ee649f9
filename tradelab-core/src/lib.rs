//! TradeLab Core — signal replay, trade accounting, and risk gating.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, open positions, trades, equity points)
//! - Cash-accounted execution engine with fee/slippage modeling
//! - Performance metrics derived from recorded run history
//! - Risk manager: position sizing, exposure limits, daily-loss tracking,
//!   consecutive-loss circuit breaker
//! - Strategy trait and the bundled MA crossover / RSI reversion / grid
//!   trading strategies
//! - Structured engine events delivered to an injected sink
//!
//! The replay loop is single-threaded and deterministic: identical bars,
//! configuration, and strategy decisions produce identical trade and equity
//! sequences.

pub mod domain;
pub mod engine;
pub mod events;
pub mod indicators;
pub mod risk;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: run state and results can cross thread boundaries.
    ///
    /// The replay itself is single-threaded, but hosts commonly hand the
    /// finished `RunResult` to a reporting or UI thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();
        require_send::<engine::BacktestEngine>();
        require_sync::<engine::BacktestEngine>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::PerformanceMetrics>();
        require_sync::<engine::PerformanceMetrics>();
        require_send::<risk::RiskManager>();
        require_sync::<risk::RiskManager>();
        require_send::<risk::RiskReport>();
        require_sync::<risk::RiskReport>();
        require_send::<events::EngineEvent>();
        require_sync::<events::EngineEvent>();
    }
}
