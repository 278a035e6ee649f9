//! Equity curve samples.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One sample of the account's mark-to-market value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    /// Mark-to-market value of the open position, zero when flat.
    pub position_value: f64,
    pub total_equity: f64,
}
