//! Risk configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied by the risk manager. All `*_size`, `*_exposure`, and
/// `*_pct`/`*_loss` values are fractions of account balance, e.g. `0.1`
/// for 10%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Largest single position, as a fraction of balance.
    pub max_position_size: f64,
    /// Cap on the summed entry value of all open positions.
    pub max_total_exposure: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Daily equity drop that trips the circuit breaker.
    pub max_daily_loss: f64,
    /// Losing streak length that trips the circuit breaker.
    pub max_consecutive_losses: u32,
    /// Gating denies all entries when balance falls to or below this.
    pub min_account_balance: f64,
    /// Manual kill switch; denies every entry while set.
    pub emergency_stop: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: 0.1,
            max_total_exposure: 0.5,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.04,
            max_daily_loss: 0.05,
            max_consecutive_losses: 3,
            min_account_balance: 0.0,
            emergency_stop: false,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("max_position_size", self.max_position_size),
            ("max_total_exposure", self.max_total_exposure),
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
            ("max_daily_loss", self.max_daily_loss),
        ];
        for (field, value) in fractions {
            if !(value > 0.0 && value <= 1.0) || !value.is_finite() {
                return Err(ConfigError::FractionOutOfRange { field, value });
            }
        }
        if self.max_position_size > self.max_total_exposure {
            return Err(ConfigError::PositionExceedsExposure {
                position: self.max_position_size,
                exposure: self.max_total_exposure,
            });
        }
        if self.max_consecutive_losses == 0 {
            return Err(ConfigError::ZeroConsecutiveLosses);
        }
        if !self.min_account_balance.is_finite() || self.min_account_balance < 0.0 {
            return Err(ConfigError::NegativeMinBalance {
                value: self.min_account_balance,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a fraction in (0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("max_position_size ({position}) exceeds max_total_exposure ({exposure})")]
    PositionExceedsExposure { position: f64, exposure: f64 },
    #[error("max_consecutive_losses must be at least 1")]
    ZeroConsecutiveLosses,
    #[error("min_account_balance must be non-negative, got {value}")]
    NegativeMinBalance { value: f64 },
}
