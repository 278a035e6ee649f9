//! RSI mean-reversion strategy.

use crate::domain::Bar;
use crate::indicators::rsi;
use crate::strategy::{Signal, SignalDecision, Strategy};

/// Buys oversold dips, exits at the midline.
///
/// Conviction rises as RSI falls deeper below the oversold threshold, with
/// full size at extreme readings. The exit fires once RSI recovers to 50;
/// extreme overbought readings are covered by the same rule.
#[derive(Debug, Clone)]
pub struct RsiReversion {
    period: usize,
    oversold: f64,
    overbought: f64,
    holding: bool,
    entry_rsi: Option<f64>,
}

impl RsiReversion {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            period,
            oversold,
            overbought,
            holding: false,
            entry_rsi: None,
        }
    }

    fn strength_for(&self, value: f64) -> f64 {
        if value < 20.0 {
            1.0
        } else if value < 25.0 {
            0.75
        } else {
            0.5
        }
    }
}

impl Default for RsiReversion {
    fn default() -> Self {
        Self::new(14, 30.0, 70.0)
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    fn min_history(&self) -> usize {
        (self.period * 3).max(100)
    }

    fn generate_signal(&mut self, history: &[Bar]) -> SignalDecision {
        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        if closes.len() <= self.period {
            return SignalDecision::hold();
        }
        let series = rsi(&closes, self.period);
        let value = series[closes.len() - 1];
        if !value.is_finite() {
            return SignalDecision::hold();
        }

        if self.holding {
            if value >= 50.0 {
                self.holding = false;
                let entry = self.entry_rsi.take();
                let mut decision = SignalDecision::new(Signal::Close, 1.0)
                    .with_info("rsi", value)
                    .with_info("overbought", self.overbought);
                if let Some(entry) = entry {
                    decision = decision.with_info("entry_rsi", entry);
                }
                return decision;
            }
            return SignalDecision::hold();
        }

        if value < self.oversold {
            self.holding = true;
            self.entry_rsi = Some(value);
            return SignalDecision::new(Signal::Long, self.strength_for(value))
                .with_info("rsi", value)
                .with_info("oversold", self.oversold);
        }

        SignalDecision::hold()
    }
}
