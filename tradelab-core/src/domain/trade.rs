//! Executed trade records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// One executed fill, recorded by the engine.
///
/// `price` is the execution price after slippage; `fee` is the commission
/// charged on the fill. `pnl`/`pnl_pct` are populated on exits only: a buy
/// realizes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
    /// Cash balance after this fill settled.
    pub cash_after: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl_pct: Option<f64>,
}

impl Trade {
    pub fn is_exit(&self) -> bool {
        self.side == TradeSide::Sell
    }

    pub fn is_winner(&self) -> bool {
        matches!(self.pnl, Some(p) if p > 0.0)
    }
}
