//! Open position held by the engine.

use serde::{Deserialize, Serialize};

/// A long position currently open in the engine.
///
/// `entry_price` is the fill price after slippage; fees paid at entry are
/// tracked in the trade record, not here. Absence of a position is encoded
/// as `Option::None` rather than a zero-quantity sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub quantity: f64,
    pub entry_price: f64,
}

impl OpenPosition {
    /// Mark-to-market value at the given price.
    pub fn value_at(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Unrealized gross PnL at the given price (fees excluded).
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity
    }
}
