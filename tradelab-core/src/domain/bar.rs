//! OHLCV bar type.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar in a historical series.
///
/// Timestamps are naive: a replay treats them as exchange-local simulated
/// time, and the engine never consults the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Calendar date of this bar, used for daily risk rollover.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Structural sanity: finite prices, positive range, consistent
    /// high/low envelope, non-negative volume.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}
