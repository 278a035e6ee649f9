//! Risk gating: sizing, exposure limits, daily-loss tracking, and the
//! consecutive-loss circuit breaker.

pub mod breaker;
pub mod config;
pub mod manager;
pub mod report;

pub use breaker::{BreakerReason, BreakerState, CircuitBreaker};
pub use config::{ConfigError, RiskConfig};
pub use manager::{PositionSide, PositionSize, RiskManager, TrackedPosition, TradeDenied};
pub use report::RiskReport;
