//! Performance metrics computed from a finished (or in-progress) run.
//!
//! All functions here are pure: they read the recorded trade list and
//! equity curve and never touch engine state.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Trade};

/// Summary statistics for a run.
///
/// A "trade" here is a completed round trip, counted at its exit fill.
/// Percentages are expressed as percent, not fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_capital: f64,
    /// Final mark-to-market equity, including any still-open position.
    pub final_capital: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: f64,
    pub avg_profit: f64,
    /// Mean realized PnL of losing trades; zero or negative.
    pub avg_loss: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    /// Gross profit over gross loss. Infinite when there are winners and
    /// no losers, zero when there are neither.
    pub profit_factor: f64,
    /// Worst peak-to-trough equity move, as a non-positive percent.
    pub max_drawdown: f64,
    /// Mean over sample standard deviation of per-trade returns.
    /// Zero when fewer than two closed trades or the returns are constant.
    pub sharpe_ratio: f64,
}

/// Compute metrics from the run history.
///
/// The equity curve must be non-empty; the engine enforces this before
/// calling.
pub fn compute(
    initial_capital: f64,
    trades: &[Trade],
    equity_curve: &[EquityPoint],
) -> PerformanceMetrics {
    let final_capital = equity_curve
        .last()
        .map_or(initial_capital, |p| p.total_equity);
    let total_return = final_capital - initial_capital;
    let total_return_pct = if initial_capital > 0.0 {
        total_return / initial_capital * 100.0
    } else {
        0.0
    };

    let realized: Vec<f64> = trades.iter().filter_map(|t| t.pnl).collect();
    let returns: Vec<f64> = trades.iter().filter_map(|t| t.pnl_pct).collect();
    let total_trades = realized.len() as u32;

    let profits: Vec<f64> = realized.iter().copied().filter(|p| *p > 0.0).collect();
    let losses: Vec<f64> = realized.iter().copied().filter(|p| *p <= 0.0).collect();
    let winning_trades = profits.len() as u32;
    let losing_trades = losses.len() as u32;

    let win_rate = if total_trades > 0 {
        winning_trades as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };

    let gross_profit: f64 = profits.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let max_profit = profits.iter().copied().fold(0.0, f64::max);
    let max_loss = losses.iter().copied().fold(0.0, f64::min);

    PerformanceMetrics {
        initial_capital,
        final_capital,
        total_return,
        total_return_pct,
        total_trades,
        winning_trades,
        losing_trades,
        win_rate,
        avg_profit: mean(&profits),
        avg_loss: mean(&losses),
        max_profit,
        max_loss,
        profit_factor,
        max_drawdown: max_drawdown_pct(equity_curve),
        sharpe_ratio: sharpe(&returns),
    }
}

/// Worst decline of total equity from its running peak, in percent.
/// Zero for a monotone curve, negative otherwise.
pub fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for point in equity_curve {
        if point.total_equity > peak {
            peak = point.total_equity;
        }
        if peak > 0.0 {
            let dd = (point.total_equity - peak) / peak * 100.0;
            worst = worst.min(dd);
        }
    }
    worst
}

fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let sd = std_dev(returns);
    if sd > 0.0 {
        mean(returns) / sd
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (n - 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
