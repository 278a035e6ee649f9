//! TOML run configuration.
//!
//! A run is fully described by one document: market and cost parameters,
//! the strategy and its knobs, risk limits, and monitor behavior. The
//! serialized document also feeds the run ID hash, so two runs with the
//! same config file get the same ID.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradelab_core::engine::ReplayConfig;
use tradelab_core::risk::RiskConfig;
use tradelab_core::strategy::{GridTrading, MaCrossover, MaType, RsiReversion, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_commission")]
    pub commission: f64,
    #[serde(default = "default_slippage")]
    pub slippage: f64,
}

fn default_capital() -> f64 {
    10_000.0
}

fn default_commission() -> f64 {
    0.001
}

fn default_slippage() -> f64 {
    0.0005
}

/// Strategy selection with per-strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    MaCrossover {
        #[serde(default = "default_fast")]
        fast_period: usize,
        #[serde(default = "default_slow")]
        slow_period: usize,
        #[serde(default = "default_ma_type")]
        ma_type: MaType,
    },
    RsiReversion {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    GridTrading {
        #[serde(default = "default_num_grids")]
        num_grids: usize,
        #[serde(default = "default_lookback")]
        range_lookback: usize,
    },
}

fn default_fast() -> usize {
    10
}

fn default_slow() -> usize {
    30
}

fn default_ma_type() -> MaType {
    MaType::Sma
}

fn default_rsi_period() -> usize {
    14
}

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

fn default_num_grids() -> usize {
    10
}

fn default_lookback() -> usize {
    50
}

impl StrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::MaCrossover { .. } => "ma_crossover",
            StrategyConfig::RsiReversion { .. } => "rsi_reversion",
            StrategyConfig::GridTrading { .. } => "grid_trading",
        }
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        match *self {
            StrategyConfig::MaCrossover {
                fast_period,
                slow_period,
                ma_type,
            } => Box::new(MaCrossover::new(fast_period, slow_period, ma_type)),
            StrategyConfig::RsiReversion {
                period,
                oversold,
                overbought,
            } => Box::new(RsiReversion::new(period, oversold, overbought)),
            StrategyConfig::GridTrading {
                num_grids,
                range_lookback,
            } => Box::new(GridTrading::new(num_grids, range_lookback)),
        }
    }
}

/// Monitor behavior; all thresholds are observational and never affect
/// trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub alert_on_trade: bool,
    pub alert_on_breaker: bool,
    /// Warn when the daily loss reaches this many percent.
    pub daily_loss_alert_pct: f64,
    /// Warn when the losing streak reaches this length.
    pub consecutive_loss_alert: u32,
    /// Minimum simulated seconds between info-level trade alerts.
    pub info_alert_interval_secs: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_on_trade: true,
            alert_on_breaker: true,
            daily_loss_alert_pct: 3.0,
            consecutive_loss_alert: 2,
            info_alert_interval_secs: 60,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl BacktestConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Stable run identifier: blake3 over the canonical JSON form.
    pub fn run_id(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        let hash = blake3::hash(&encoded);
        hash.to_hex()[..16].to_string()
    }

    pub fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            symbol: self.backtest.symbol.clone(),
            initial_capital: self.backtest.initial_capital,
            commission: self.backtest.commission,
            slippage: self.backtest.slippage,
            risk: self.risk.clone(),
        }
    }

    /// Non-fatal sanity warnings about aggressive or unrealistic settings.
    pub fn validate_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.backtest.commission == 0.0 {
            warnings.push("commission is zero; results will overstate returns".to_string());
        }
        if self.backtest.slippage == 0.0 {
            warnings.push("slippage is zero; fills assume perfect liquidity".to_string());
        }
        if self.risk.max_position_size > 0.2 {
            warnings.push(format!(
                "max_position_size {:.0}% is aggressive (>20%)",
                self.risk.max_position_size * 100.0
            ));
        }
        if self.risk.max_daily_loss > 0.1 {
            warnings.push(format!(
                "max_daily_loss {:.0}% allows deep daily drawdowns (>10%)",
                self.risk.max_daily_loss * 100.0
            ));
        }
        if self.risk.stop_loss_pct >= self.risk.take_profit_pct {
            warnings.push(
                "stop_loss_pct is not below take_profit_pct; risk/reward is inverted".to_string(),
            );
        }
        if let StrategyConfig::MaCrossover {
            fast_period,
            slow_period,
            ..
        } = self.strategy
        {
            if fast_period >= slow_period {
                warnings.push(format!(
                    "fast_period {fast_period} is not below slow_period {slow_period}"
                ));
            }
        }
        warnings
    }
}
