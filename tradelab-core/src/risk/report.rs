//! Snapshot of risk state for monitoring and artifacts.

use serde::{Deserialize, Serialize};

/// Point-in-time view of the risk manager, safe to serialize into run
/// artifacts or hand to a monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub initialized: bool,
    pub balance: f64,
    pub daily_start_balance: f64,
    pub daily_loss_pct: f64,
    pub daily_pnl: f64,
    pub consecutive_losses: u32,
    pub open_positions: usize,
    pub exposure_pct: f64,
    pub circuit_breaker_tripped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker_reason: Option<String>,
    pub emergency_stop: bool,
}
