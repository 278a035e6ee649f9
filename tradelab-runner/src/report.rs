//! Plain-text report rendering.

use tradelab_core::engine::PerformanceMetrics;
use tradelab_core::risk::RiskReport;

use crate::monitor::MonitorSummary;

fn fmt_profit_factor(pf: f64) -> String {
    if pf.is_infinite() {
        "inf (no losing trades)".to_string()
    } else {
        format!("{pf:.2}")
    }
}

fn verdict(metrics: &PerformanceMetrics) -> &'static str {
    if metrics.win_rate >= 50.0 && metrics.profit_factor >= 1.5 {
        "good: solid hit rate with favorable payoff"
    } else if metrics.win_rate >= 40.0 && metrics.profit_factor >= 1.2 {
        "average: tradeable but thin edge"
    } else {
        "poor: strategy loses money or the edge is too small"
    }
}

/// Render the performance summary of one run.
pub fn performance_report(
    metrics: &PerformanceMetrics,
    symbol: &str,
    strategy: &str,
) -> String {
    let mut out = String::new();
    out.push_str("══════════ Backtest Performance ══════════\n");
    out.push_str(&format!("symbol:          {symbol}\n"));
    out.push_str(&format!("strategy:        {strategy}\n"));
    out.push_str(&format!(
        "capital:         {:.2} -> {:.2}\n",
        metrics.initial_capital, metrics.final_capital
    ));
    out.push_str(&format!(
        "total return:    {:+.2} ({:+.2}%)\n",
        metrics.total_return, metrics.total_return_pct
    ));
    out.push_str(&format!(
        "trades:          {} ({} wins / {} losses, {:.1}% win rate)\n",
        metrics.total_trades, metrics.winning_trades, metrics.losing_trades, metrics.win_rate
    ));
    out.push_str(&format!(
        "avg win/loss:    {:+.2} / {:+.2}\n",
        metrics.avg_profit, metrics.avg_loss
    ));
    out.push_str(&format!(
        "best/worst:      {:+.2} / {:+.2}\n",
        metrics.max_profit, metrics.max_loss
    ));
    out.push_str(&format!(
        "profit factor:   {}\n",
        fmt_profit_factor(metrics.profit_factor)
    ));
    out.push_str(&format!("max drawdown:    {:.2}%\n", metrics.max_drawdown));
    out.push_str(&format!("sharpe ratio:    {:.2}\n", metrics.sharpe_ratio));
    out.push_str(&format!("verdict:         {}\n", verdict(metrics)));
    if metrics.max_drawdown < -30.0 {
        out.push_str("warning:         drawdown exceeded 30%; sizing is too aggressive\n");
    }
    if metrics.total_trades < 20 {
        out.push_str("note:            fewer than 20 trades; results are not significant\n");
    }
    out
}

/// Render the end-of-run risk and monitoring summary.
pub fn daily_report(summary: &MonitorSummary, risk: &RiskReport) -> String {
    let mut out = String::new();
    out.push_str("══════════ Risk & Monitoring ══════════\n");
    out.push_str(&format!("balance:             {:.2}\n", risk.balance));
    out.push_str(&format!(
        "daily pnl:           {:+.2} ({:.2}% down from anchor)\n",
        risk.daily_pnl, risk.daily_loss_pct
    ));
    out.push_str(&format!(
        "exposure:            {:.1}% across {} position(s)\n",
        risk.exposure_pct, risk.open_positions
    ));
    out.push_str(&format!(
        "consecutive losses:  {}\n",
        risk.consecutive_losses
    ));
    match &risk.circuit_breaker_reason {
        Some(reason) => out.push_str(&format!("circuit breaker:     TRIPPED ({reason})\n")),
        None => out.push_str("circuit breaker:     armed\n"),
    }
    out.push_str(&format!(
        "events:              {} trades, {} denials, {} skips, {} breaker trip(s)\n",
        summary.trades_executed,
        summary.risk_denials,
        summary.insufficient_funds,
        summary.breaker_trips
    ));
    out
}
