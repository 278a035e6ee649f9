//! Run artifacts: trades.csv, equity.csv, metrics.json per run directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use tradelab_core::domain::{EquityPoint, Trade};

use crate::runner::BacktestResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn write_trades_csv(path: &Path, trades: &[Trade]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "timestamp",
        "side",
        "price",
        "quantity",
        "fee",
        "cash_after",
        "pnl",
        "pnl_pct",
    ])?;
    for trade in trades {
        writer.write_record([
            trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            trade.side.to_string(),
            format!("{}", trade.price),
            format!("{}", trade.quantity),
            format!("{}", trade.fee),
            format!("{}", trade.cash_after),
            trade.pnl.map(|v| v.to_string()).unwrap_or_default(),
            trade.pnl_pct.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_equity_csv(path: &Path, curve: &[EquityPoint]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "cash", "position_value", "total_equity"])?;
    for point in curve {
        writer.write_record([
            point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{}", point.cash),
            format!("{}", point.position_value),
            format!("{}", point.total_equity),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the run's artifacts under `out_dir/<run_id>/` and return that
/// directory. Existing artifacts for the same run ID are overwritten.
pub fn save_artifacts(result: &BacktestResult, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let dir = out_dir.join(&result.run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating artifact directory {}", dir.display()))?;

    write_trades_csv(&dir.join("trades.csv"), &result.trades).context("writing trades.csv")?;
    write_equity_csv(&dir.join("equity.csv"), &result.equity_curve)
        .context("writing equity.csv")?;

    let summary = json!({
        "run_id": result.run_id,
        "symbol": result.symbol,
        "strategy": result.strategy,
        "bar_count": result.bar_count,
        "signal_count": result.signal_count,
        "final_equity": result.final_equity,
        "metrics": result.metrics,
        "risk_report": result.risk_report,
        "monitor": result.monitor,
    });
    let file = File::create(dir.join("metrics.json")).context("creating metrics.json")?;
    serde_json::to_writer_pretty(file, &summary).context("writing metrics.json")?;

    Ok(dir)
}
