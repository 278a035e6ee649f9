//! Moving-average crossover strategy.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::{ema, sma, wma};
use crate::strategy::{Signal, SignalDecision, Strategy};

/// Which moving-average kernel drives the crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    Sma,
    Ema,
    Wma,
}

/// Golden-cross entry, death-cross exit.
///
/// Entry conviction scales with how far the fast average has pulled away
/// from the slow one at the cross. A death cross only emits `Close` if the
/// strategy itself opened the position; cold-starting mid-downtrend stays
/// flat.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast_period: usize,
    slow_period: usize,
    ma_type: MaType,
    last_signal: Option<Signal>,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize, ma_type: MaType) -> Self {
        Self {
            fast_period,
            slow_period,
            ma_type,
            last_signal: None,
        }
    }

    fn average(&self, closes: &[f64], period: usize) -> Vec<f64> {
        match self.ma_type {
            MaType::Sma => sma(closes, period),
            MaType::Ema => ema(closes, period),
            MaType::Wma => wma(closes, period),
        }
    }

    fn strength_for_spread(spread_pct: f64) -> f64 {
        if spread_pct < 0.5 {
            0.5
        } else if spread_pct < 1.0 {
            0.75
        } else {
            1.0
        }
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(10, 30, MaType::Sma)
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn min_history(&self) -> usize {
        (self.slow_period * 2).max(100)
    }

    fn generate_signal(&mut self, history: &[Bar]) -> SignalDecision {
        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        if closes.len() < self.slow_period + 1 {
            return SignalDecision::hold();
        }

        let fast = self.average(&closes, self.fast_period);
        let slow = self.average(&closes, self.slow_period);
        let i = closes.len() - 1;
        let (f_prev, f_now) = (fast[i - 1], fast[i]);
        let (s_prev, s_now) = (slow[i - 1], slow[i]);
        if !(f_prev.is_finite() && f_now.is_finite() && s_prev.is_finite() && s_now.is_finite()) {
            return SignalDecision::hold();
        }

        let spread_pct = if s_now != 0.0 {
            (f_now - s_now).abs() / s_now * 100.0
        } else {
            0.0
        };

        // Golden cross: fast closes above slow after being at or below it.
        if f_prev <= s_prev && f_now > s_now {
            self.last_signal = Some(Signal::Long);
            return SignalDecision::new(Signal::Long, Self::strength_for_spread(spread_pct))
                .with_info("fast_ma", f_now)
                .with_info("slow_ma", s_now)
                .with_info("spread_pct", spread_pct);
        }

        // Death cross closes a position we opened; otherwise stay flat.
        if f_prev >= s_prev && f_now < s_now {
            if self.last_signal == Some(Signal::Long) {
                self.last_signal = Some(Signal::Close);
                return SignalDecision::new(Signal::Close, 1.0)
                    .with_info("fast_ma", f_now)
                    .with_info("slow_ma", s_now);
            }
            return SignalDecision::hold();
        }

        SignalDecision::hold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open: *c,
                high: c * 1.01,
                low: c * 0.99,
                close: *c,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn golden_cross_emits_long() {
        let mut strat = MaCrossover::new(2, 3, MaType::Sma);
        let history = bars(&[10.0, 9.0, 8.0, 7.0, 9.0, 12.0]);
        let decision = strat.generate_signal(&history);
        assert_eq!(decision.signal, Signal::Long);
        assert_eq!(decision.strength, 1.0);
        assert!(decision.info.contains_key("spread_pct"));
    }

    #[test]
    fn weak_cross_gets_half_strength() {
        let mut strat = MaCrossover::new(2, 3, MaType::Sma);
        let history = bars(&[100.0, 99.9, 99.8, 100.05]);
        let decision = strat.generate_signal(&history);
        assert_eq!(decision.signal, Signal::Long);
        assert_eq!(decision.strength, 0.5);
    }

    #[test]
    fn death_cross_closes_only_after_own_entry() {
        let mut strat = MaCrossover::new(2, 3, MaType::Sma);
        // Cold start straight into a death cross: no position to close.
        let falling = bars(&[7.0, 9.0, 12.0, 9.0, 7.0]);
        assert_eq!(strat.generate_signal(&falling).signal, Signal::Hold);

        // Golden cross then death cross on the extended series.
        let mut strat = MaCrossover::new(2, 3, MaType::Sma);
        let up = bars(&[10.0, 9.0, 8.0, 7.0, 9.0, 12.0]);
        assert_eq!(strat.generate_signal(&up).signal, Signal::Long);
        let down = bars(&[10.0, 9.0, 8.0, 7.0, 9.0, 12.0, 9.0, 7.0]);
        assert_eq!(strat.generate_signal(&down).signal, Signal::Close);
    }

    #[test]
    fn holds_during_warmup() {
        let mut strat = MaCrossover::new(2, 3, MaType::Sma);
        assert_eq!(
            strat.generate_signal(&bars(&[10.0, 11.0])).signal,
            Signal::Hold
        );
    }

    #[test]
    fn min_history_floors_at_100() {
        assert_eq!(MaCrossover::new(2, 3, MaType::Sma).min_history(), 100);
        assert_eq!(MaCrossover::new(10, 60, MaType::Ema).min_history(), 120);
    }
}
