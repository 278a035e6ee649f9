//! Grid trading strategy.

use crate::domain::Bar;
use crate::strategy::{Signal, SignalDecision, Strategy};

#[derive(Debug, Clone, Copy)]
struct GridSlot {
    entry_price: f64,
    target_price: f64,
}

/// Buys grid-level touches inside a recent range, sells one level up.
///
/// The grid is laid over the min/max of the lookback window on first use
/// and torn down when price escapes the range by more than the breakout
/// margin; an open slot is force-closed on breakout. Conviction scales
/// with recent volatility, since grids earn more when price oscillates.
#[derive(Debug, Clone)]
pub struct GridTrading {
    num_grids: usize,
    range_lookback: usize,
    levels: Vec<f64>,
    active: Option<GridSlot>,
}

/// Price escape beyond the grid range that forces a rebuild.
const BREAKOUT_MARGIN: f64 = 0.02;
/// Bars of percent-changes used for the volatility estimate.
const VOLATILITY_WINDOW: usize = 20;

impl GridTrading {
    pub fn new(num_grids: usize, range_lookback: usize) -> Self {
        Self {
            num_grids: num_grids.max(2),
            range_lookback: range_lookback.max(2),
            levels: Vec::new(),
            active: None,
        }
    }

    fn build_levels(&mut self, closes: &[f64]) {
        let window = &closes[closes.len().saturating_sub(self.range_lookback)..];
        let mut lower = f64::INFINITY;
        let mut upper = f64::NEG_INFINITY;
        for c in window {
            lower = lower.min(*c);
            upper = upper.max(*c);
        }
        if !(upper > lower) {
            self.levels.clear();
            return;
        }
        let step = (upper - lower) / self.num_grids as f64;
        self.levels = (0..=self.num_grids)
            .map(|i| lower + step * i as f64)
            .collect();
    }

    /// Standard deviation of recent percent changes, in percent.
    fn volatility(closes: &[f64]) -> f64 {
        let window = &closes[closes.len().saturating_sub(VOLATILITY_WINDOW + 1)..];
        if window.len() < 3 {
            return 0.0;
        }
        let changes: Vec<f64> = window
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0] * 100.0)
            .collect();
        if changes.len() < 2 {
            return 0.0;
        }
        let mean = changes.iter().sum::<f64>() / changes.len() as f64;
        let var = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>()
            / (changes.len() - 1) as f64;
        var.sqrt()
    }

    fn strength_for_volatility(vol: f64) -> f64 {
        if vol >= 2.0 {
            1.0
        } else if vol >= 1.0 {
            0.75
        } else {
            0.5
        }
    }
}

impl Default for GridTrading {
    fn default() -> Self {
        Self::new(10, 50)
    }
}

impl Strategy for GridTrading {
    fn name(&self) -> &str {
        "grid_trading"
    }

    fn min_history(&self) -> usize {
        self.range_lookback.max(50)
    }

    fn generate_signal(&mut self, history: &[Bar]) -> SignalDecision {
        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        if closes.len() < 2 {
            return SignalDecision::hold();
        }
        let price = closes[closes.len() - 1];
        let prev = closes[closes.len() - 2];

        if self.levels.is_empty() {
            self.build_levels(&closes);
            if self.levels.is_empty() {
                return SignalDecision::hold();
            }
        }
        let lower = self.levels[0];
        let upper = self.levels[self.levels.len() - 1];

        // Range breakout tears the grid down; it is rebuilt over the new
        // range on the next bar.
        if price > upper * (1.0 + BREAKOUT_MARGIN) || price < lower * (1.0 - BREAKOUT_MARGIN) {
            self.levels.clear();
            if let Some(slot) = self.active.take() {
                return SignalDecision::new(Signal::Close, 1.0)
                    .with_info("trigger", "range_breakout")
                    .with_info("entry_price", slot.entry_price);
            }
            return SignalDecision::hold();
        }

        if let Some(slot) = self.active {
            if price >= slot.target_price {
                self.active = None;
                return SignalDecision::new(Signal::Close, 1.0)
                    .with_info("trigger", "grid_target")
                    .with_info("target_price", slot.target_price);
            }
            return SignalDecision::hold();
        }

        // Entry: price crossed down through a grid level with a level
        // above it to sell into. With several levels crossed in one bar,
        // take the highest.
        if let Some((idx, level)) = self
            .levels
            .iter()
            .enumerate()
            .filter(|(_, level)| prev > **level && price <= **level)
            .map(|(i, l)| (i, *l))
            .next_back()
        {
            if idx + 1 < self.levels.len() {
                let target = self.levels[idx + 1];
                self.active = Some(GridSlot {
                    entry_price: price,
                    target_price: target,
                });
                let vol = Self::volatility(&closes);
                return SignalDecision::new(Signal::Long, Self::strength_for_volatility(vol))
                    .with_info("grid_level", level)
                    .with_info("target_price", target)
                    .with_info("volatility_pct", vol);
            }
        }

        SignalDecision::hold()
    }
}
