//! Run orchestration — wires the model, simulator, and metrics together.
//!
//! Two entry points:
//! - `run_backtest()`: takes a loaded series plus validated inputs. Used by sweeps.
//! - `run_from_config()`: resolves a `RunConfig`, loads its CSV, then runs. Used by the CLI.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use revertlab_core::{
    run_model, Account, ConfigError, Hyperparameters, ModelError, ModelFrame, PriceSeries,
};

use crate::config::{run_id, RunConfig, RunConfigError, RunId};
use crate::data_loader::{load_csv, LoadError};
use crate::metrics::MetricsSnapshot;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("config file error: {0}")]
    ConfigFile(#[from] RunConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("no price data: set `data` in the [run] section")]
    NoData,
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub params: Hyperparameters,
    pub cash: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub bars_in_market: usize,
    pub metrics: MetricsSnapshot,
    /// Per-bar columns. Exported separately as CSV.
    #[serde(skip)]
    pub frame: ModelFrame,
}

/// Run one parameter set over a loaded series. No I/O.
pub fn run_backtest(
    prices: &PriceSeries,
    params: &Hyperparameters,
    account: &Account,
    symbol: &str,
) -> Result<BacktestResult, ModelError> {
    let frame = run_model(prices, params, account)?;
    let metrics = MetricsSnapshot::summarize(&frame, account.cash());

    if !frame.is_empty() && metrics.traded_periods == 0 {
        tracing::warn!(symbol, params = %params, "run never entered the market");
    }
    tracing::debug!(
        symbol,
        params = %params,
        bars = frame.len(),
        warmup = frame.warmup_bars(),
        net_return_pct = metrics.net_return_pct,
        annual_sharpe = metrics.annual_sharpe,
        "run complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: run_id(symbol, params, account),
        symbol: symbol.to_string(),
        params: *params,
        cash: account.cash(),
        start_date: prices.first_date(),
        end_date: prices.last_date(),
        bar_count: frame.len(),
        warmup_bars: frame.warmup_bars(),
        bars_in_market: frame.bars_in_market(),
        metrics,
        frame,
    })
}

/// Resolve a config, load its data file, and run.
pub fn run_from_config(config: &RunConfig) -> Result<BacktestResult, RunError> {
    let resolved = config.resolve()?;
    let path = resolved.data.as_deref().ok_or(RunError::NoData)?;
    let prices = load_csv(path)?;

    tracing::info!(
        symbol = %resolved.symbol,
        path = %path.display(),
        bars = prices.len(),
        params = %resolved.params,
        "starting run"
    );
    let result = run_backtest(&prices, &resolved.params, &resolved.account, &resolved.symbol)?;
    tracing::info!(
        run_id = %result.run_id,
        final_equity = result.metrics.final_equity,
        "run finished"
    );
    Ok(result)
}
