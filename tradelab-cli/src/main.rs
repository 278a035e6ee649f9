//! `tradelab` — run backtests from config files or presets.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tradelab_runner::{
    export, load_bars_csv, run_backtest, synthetic_oscillating, synthetic_trending,
    BacktestConfig,
};

#[derive(Parser)]
#[command(name = "tradelab", version, about = "Backtest trading strategies over OHLCV data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one backtest and print the report.
    Run {
        /// TOML config file describing the run.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,
        /// Use a built-in strategy preset instead of a config file.
        #[arg(long, value_enum, conflicts_with = "config")]
        preset: Option<Preset>,
        /// CSV file with timestamp,open,high,low,close,volume rows.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Generate a synthetic series instead of loading CSV data.
        #[arg(long, value_enum, conflicts_with = "data")]
        synthetic: Option<SyntheticKind>,
        /// Number of synthetic bars.
        #[arg(long, default_value_t = 720)]
        bars: usize,
        /// Seed for the synthetic series.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Write trades.csv / equity.csv / metrics.json under this directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the built-in presets.
    Presets,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    MaCrossover,
    RsiReversion,
    GridTrading,
}

impl Preset {
    fn config(self) -> BacktestConfig {
        let kind = match self {
            Preset::MaCrossover => "ma_crossover",
            Preset::RsiReversion => "rsi_reversion",
            Preset::GridTrading => "grid_trading",
        };
        let text = format!(
            r#"
            [backtest]
            symbol = "BTC/USDT"

            [strategy]
            kind = "{kind}"
            "#
        );
        // The preset documents are fixed strings; they always parse.
        BacktestConfig::from_toml(&text).unwrap_or_else(|e| panic!("builtin preset invalid: {e}"))
    }

    fn default_synthetic(self) -> SyntheticKind {
        match self {
            Preset::MaCrossover => SyntheticKind::Trending,
            Preset::RsiReversion | Preset::GridTrading => SyntheticKind::Oscillating,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SyntheticKind {
    Trending,
    Oscillating,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Presets => {
            for preset in [Preset::MaCrossover, Preset::RsiReversion, Preset::GridTrading] {
                let config = preset.config();
                println!(
                    "{:<15} symbol={} capital={}",
                    config.strategy.name(),
                    config.backtest.symbol,
                    config.backtest.initial_capital
                );
            }
            Ok(())
        }
        Command::Run {
            config,
            preset,
            data,
            synthetic,
            bars,
            seed,
            output,
        } => {
            let config = match (config, preset) {
                (Some(path), None) => BacktestConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                (None, Some(preset)) => preset.config(),
                _ => bail!("provide exactly one of --config or --preset"),
            };

            let series = match (&data, synthetic) {
                (Some(path), _) => {
                    load_bars_csv(path).with_context(|| format!("loading {}", path.display()))?
                }
                (None, kind) => {
                    if bars == 0 {
                        bail!("--bars must be positive for synthetic data");
                    }
                    let kind = kind
                        .or(preset.map(Preset::default_synthetic))
                        .unwrap_or(SyntheticKind::Trending);
                    match kind {
                        SyntheticKind::Trending => synthetic_trending(bars, seed),
                        SyntheticKind::Oscillating => synthetic_oscillating(bars, seed),
                    }
                }
            };

            let result = run_backtest(&config, &series)?;
            print!("{}", result.render_report());

            if let Some(out_dir) = output {
                let dir = export::save_artifacts(&result, &out_dir)?;
                println!("\nartifacts written to {}", dir.display());
            }
            Ok(())
        }
    }
}
