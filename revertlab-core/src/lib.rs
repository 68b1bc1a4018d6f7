//! RevertLab Core — mean-reversion signal model and equity simulation.
//!
//! This crate contains the computational heart of a run:
//! - Domain types (bars, validated price series) and the tabular schema check
//! - Validated hyperparameters and account configuration
//! - Rolling and exponentially weighted estimators
//! - Spread z-score model with per-side entry/exit hysteresis
//! - One-bar signal lag, side masking, and the equity/drawdown path
//!
//! Every stage is a pure function of its inputs. A run is
//! `model::build` → `simulator::simulate`, and runs share no state, so
//! independent parameter sets can be evaluated on separate threads.

pub mod domain;
pub mod indicators;
pub mod model;
pub mod params;
pub mod schema;
pub mod simulator;

pub use domain::{Bar, PriceSeries, SeriesError};
pub use model::{ModelError, ModelFrame, SignalFrame};
pub use params::{Account, CalcType, ConfigError, HyperparameterInput, Hyperparameters, Side};
pub use schema::{OhlcColumns, SchemaError};

/// Build the signal frame and attach the equity path in one call.
pub fn run_model(
    prices: &PriceSeries,
    params: &Hyperparameters,
    account: &Account,
) -> Result<ModelFrame, ModelError> {
    let signals = model::build(prices, params)?;
    Ok(simulator::simulate(signals, account))
}
