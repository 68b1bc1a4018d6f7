//! Run configuration file.
//!
//! ```toml
//! [run]
//! symbol = "SPY"
//! data = "data/spy.csv"
//! cash = 1000000.0
//!
//! [hyperparameters]
//! mean_period = 20
//! calc_type = "exponential"
//! side = "long"
//! ```
//!
//! Every key is optional. Missing hyperparameters fall back to their
//! defaults, a missing `cash` falls back to the default account.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use revertlab_core::{Account, ConfigError, HyperparameterInput, Hyperparameters};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Symbol label used when the file does not name one.
pub const DEFAULT_SYMBOL: &str = "SERIES";

/// Errors from reading a run configuration file.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// `[run]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub symbol: Option<String>,
    /// CSV price file. Relative paths resolve against the config file's directory.
    pub data: Option<PathBuf>,
    pub cash: Option<f64>,
}

/// Raw run configuration as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub run: RunSection,
    pub hyperparameters: HyperparameterInput,
}

/// Validated configuration, ready to run.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub symbol: String,
    pub data: Option<PathBuf>,
    pub params: Hyperparameters,
    pub account: Account,
}

impl RunConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, RunConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a config file. A relative `data` path is rebased onto
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(data), Some(dir)) = (config.run.data.as_ref(), path.parent()) {
            if data.is_relative() {
                config.run.data = Some(dir.join(data));
            }
        }
        Ok(config)
    }

    /// Validate hyperparameters and cash.
    pub fn resolve(&self) -> Result<ResolvedRun, ConfigError> {
        let params = self.hyperparameters.resolve()?;
        let account = match self.run.cash {
            Some(cash) => Account::new(cash)?,
            None => Account::default(),
        };
        let symbol = self
            .run
            .symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYMBOL)
            .to_string();
        Ok(ResolvedRun {
            symbol,
            data: self.run.data.clone(),
            params,
            account,
        })
    }
}

impl ResolvedRun {
    /// Deterministic id of this run's inputs.
    pub fn run_id(&self) -> RunId {
        run_id(&self.symbol, &self.params, &self.account)
    }
}

/// BLAKE3 hash over the symbol and the resolved inputs.
///
/// Two runs with identical inputs share a RunId.
pub fn run_id(symbol: &str, params: &Hyperparameters, account: &Account) -> RunId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    hasher.update(&[0]);
    for period in [
        params.mean_period(),
        params.spread_mean_period(),
        params.spread_sdev_period(),
    ] {
        hasher.update(&(period as u64).to_le_bytes());
    }
    hasher.update(&params.threshold().to_le_bytes());
    hasher.update(params.calc_type().name().as_bytes());
    hasher.update(&[0]);
    hasher.update(params.side().name().as_bytes());
    hasher.update(&account.cash().to_le_bytes());
    hasher.finalize().to_hex().to_string()
}
