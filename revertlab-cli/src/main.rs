//! RevertLab CLI — run and sweep commands.
//!
//! Commands:
//! - `run` — one model run from a TOML config, a CSV file, or a synthetic series
//! - `sweep` — parallel grid search over hyperparameters, ranked by annualized Sharpe

mod logging;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use revertlab_core::{CalcType, PriceSeries, Side};
use revertlab_runner::report::{render_leaderboard, render_run};
use revertlab_runner::{
    generate_synthetic, load_csv, run_backtest, save_artifacts, save_sweep, ParamGrid,
    ParamSweep, RunConfig, SyntheticSpec,
};

use crate::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "revertlab", about = "RevertLab CLI — spread z-score mean-reversion backtests")]
struct Cli {
    /// Debug-level logging (ignored when RUST_LOG is set).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model once and print the results block.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Write result.json, metrics.json, and frame.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run a hyperparameter grid and print the leaderboard.
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Mean periods to test.
        #[arg(long, value_delimiter = ',', default_values_t = [10, 20, 40])]
        mean_periods: Vec<usize>,

        /// Spread mean periods to test.
        #[arg(long, value_delimiter = ',', default_values_t = [5, 10, 20])]
        spread_mean_periods: Vec<usize>,

        /// Spread deviation periods to test.
        #[arg(long, value_delimiter = ',', default_values_t = [5, 10, 20])]
        spread_sdev_periods: Vec<usize>,

        /// Z-score thresholds to test.
        #[arg(long, value_delimiter = ',', default_values_t = [0.5, 1.0, 1.5, 2.0])]
        thresholds: Vec<f64>,

        /// Calc types (name or 1-based index).
        #[arg(long, value_delimiter = ',', default_values = ["simple", "exponential"])]
        calc_types: Vec<String>,

        /// Sides (name or 1-based index).
        #[arg(long, value_delimiter = ',', default_values = ["long"])]
        sides: Vec<String>,

        /// Rows in the printed leaderboard.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run grid points one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the ranked leaderboard CSV under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Where prices and the base configuration come from.
#[derive(Args)]
struct SourceArgs {
    /// TOML run config. Command-line values override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV price file with date/open/high/low/close columns.
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Use a deterministic synthetic mean-reverting series (seeded by the symbol).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Bars in the synthetic series.
    #[arg(long, default_value_t = 2_000)]
    bars: usize,

    /// Symbol label for reports and artifact names.
    #[arg(long)]
    symbol: Option<String>,

    /// Starting capital.
    #[arg(long)]
    cash: Option<f64>,
}

/// Hyperparameter overrides for a single run.
#[derive(Args)]
struct ParamArgs {
    #[arg(long)]
    mean_period: Option<i64>,

    #[arg(long)]
    spread_mean_period: Option<i64>,

    #[arg(long)]
    spread_sdev_period: Option<i64>,

    /// Entry threshold; its absolute value is used.
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<f64>,

    /// simple | exponential (or 1 | 2).
    #[arg(long)]
    calc_type: Option<String>,

    /// long | short | neutral (or 1 | 2 | 3).
    #[arg(long)]
    side: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Run {
            source,
            params,
            output_dir,
        } => run_cmd(source, params, output_dir),
        Commands::Sweep {
            source,
            mean_periods,
            spread_mean_periods,
            spread_sdev_periods,
            thresholds,
            calc_types,
            sides,
            top,
            sequential,
            output_dir,
        } => {
            let grid = ParamGrid {
                mean_periods,
                spread_mean_periods,
                spread_sdev_periods,
                thresholds,
                calc_types: calc_types
                    .iter()
                    .map(|s| s.parse::<CalcType>())
                    .collect::<Result<_, _>>()?,
                sides: sides
                    .iter()
                    .map(|s| s.parse::<Side>())
                    .collect::<Result<_, _>>()?,
            };
            sweep_cmd(source, grid, top, sequential, output_dir)
        }
    }
}

fn run_cmd(source: SourceArgs, params: ParamArgs, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = base_config(&source)?;
    let hp = &mut config.hyperparameters;
    hp.mean_period = params.mean_period.or(hp.mean_period);
    hp.spread_mean_period = params.spread_mean_period.or(hp.spread_mean_period);
    hp.spread_sdev_period = params.spread_sdev_period.or(hp.spread_sdev_period);
    hp.threshold = params.threshold.or(hp.threshold);
    hp.calc_type = params.calc_type.or(hp.calc_type.take());
    hp.side = params.side.or(hp.side.take());

    let resolved = config.resolve()?;
    let prices = load_prices(&source, &config, &resolved.symbol)?;
    let result = run_backtest(&prices, &resolved.params, &resolved.account, &resolved.symbol)?;

    print!("{}", render_run(&result));

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        println!("\nArtifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn sweep_cmd(
    source: SourceArgs,
    grid: ParamGrid,
    top: usize,
    sequential: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = base_config(&source)?;
    let resolved = config.resolve()?;
    let prices = load_prices(&source, &config, &resolved.symbol)?;

    let sweep = ParamSweep::new(resolved.account).with_parallelism(!sequential);
    let results = sweep.sweep(&prices, &grid, &resolved.symbol)?;

    println!("{} | {} runs over {} bars", resolved.symbol, results.len(), prices.len());
    print!("{}", render_leaderboard(&results, top));
    if results.best().is_none() {
        println!("No run produced a defined Sharpe ratio.");
    }

    if let Some(dir) = output_dir {
        let path = save_sweep(&results, &resolved.symbol, &dir)?;
        println!("\nLeaderboard saved to: {}", path.display());
    }
    Ok(())
}

/// Config file (if any) with the source-level overrides applied.
fn base_config(source: &SourceArgs) -> Result<RunConfig> {
    let mut config = match &source.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(symbol) = &source.symbol {
        config.run.symbol = Some(symbol.clone());
    }
    if let Some(cash) = source.cash {
        config.run.cash = Some(cash);
    }
    if let Some(data) = &source.data {
        config.run.data = Some(data.clone());
    }
    if source.synthetic {
        config.run.data = None;
    }
    Ok(config)
}

fn load_prices(source: &SourceArgs, config: &RunConfig, symbol: &str) -> Result<PriceSeries> {
    if source.synthetic {
        let spec = SyntheticSpec {
            bars: source.bars,
            ..SyntheticSpec::default()
        };
        tracing::warn!(symbol, bars = spec.bars, "using synthetic prices");
        return Ok(generate_synthetic(symbol, &spec)?);
    }
    match &config.run.data {
        Some(path) => {
            load_csv(path).with_context(|| format!("failed to load prices from {}", path.display()))
        }
        None => bail!("no price data: pass --data, --synthetic, or set `data` in the config"),
    }
}
