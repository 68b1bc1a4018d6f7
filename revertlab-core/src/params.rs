//! Hyperparameters and account configuration.
//!
//! Raw inputs arrive as [`HyperparameterInput`] (every field optional, parsed
//! from TOML or assembled by a caller) and are resolved into an immutable,
//! validated [`Hyperparameters`]. Absent fields take the defaults below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MEAN_PERIOD: usize = 20;
pub const DEFAULT_SPREAD_MEAN_PERIOD: usize = 10;
pub const DEFAULT_SPREAD_SDEV_PERIOD: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 1.0;
pub const DEFAULT_CASH: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be > 0, got {value}")]
    NonPositivePeriod { field: &'static str, value: i64 },

    #[error("threshold must be a non-zero finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("invalid calculation type '{0}' (expected simple or exponential)")]
    InvalidCalcType(String),

    #[error("invalid side '{0}' (expected long, short or neutral)")]
    InvalidSide(String),

    #[error("cash must be a positive finite number, got {0}")]
    NonPositiveCash(f64),

    #[error("parse hyperparameters TOML: {0}")]
    Parse(String),
}

/// Estimator family used for the rolling mean and the spread statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcType {
    /// Trailing arithmetic window.
    Simple,
    /// Exponentially weighted, span-parameterized.
    Exponential,
}

impl CalcType {
    pub const ALL: [CalcType; 2] = [CalcType::Simple, CalcType::Exponential];

    pub fn name(self) -> &'static str {
        match self {
            CalcType::Simple => "simple",
            CalcType::Exponential => "exponential",
        }
    }
}

/// Which direction's returns are realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
    /// Both directions realized.
    Neutral,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Long, Side::Short, Side::Neutral];

    pub fn name(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
            Side::Neutral => "neutral",
        }
    }

    /// Whether a realized position in this direction keeps its return.
    pub fn allows(self, position: i8) -> bool {
        match self {
            Side::Long => position != -1,
            Side::Short => position != 1,
            Side::Neutral => true,
        }
    }
}

/// Parse by name (case-insensitive) or by 1-based index into `all`.
fn parse_choice<T: Copy>(input: &str, all: &[T], name: impl Fn(T) -> &'static str) -> Option<T> {
    let trimmed = input.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| all.get(i).copied());
    }
    all.iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(trimmed))
}

impl FromStr for CalcType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, &CalcType::ALL, CalcType::name)
            .ok_or_else(|| ConfigError::InvalidCalcType(s.to_string()))
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, &Side::ALL, Side::name).ok_or_else(|| ConfigError::InvalidSide(s.to_string()))
    }
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated, immutable model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hyperparameters {
    mean_period: usize,
    spread_mean_period: usize,
    spread_sdev_period: usize,
    threshold: f64,
    calc_type: CalcType,
    side: Side,
}

impl Hyperparameters {
    /// Build from already-typed values. `threshold` is stored as its absolute value.
    pub fn new(
        mean_period: usize,
        spread_mean_period: usize,
        spread_sdev_period: usize,
        threshold: f64,
        calc_type: CalcType,
        side: Side,
    ) -> Result<Self, ConfigError> {
        HyperparameterInput {
            mean_period: Some(mean_period as i64),
            spread_mean_period: Some(spread_mean_period as i64),
            spread_sdev_period: Some(spread_sdev_period as i64),
            threshold: Some(threshold),
            calc_type: Some(calc_type.name().to_string()),
            side: Some(side.name().to_string()),
        }
        .resolve()
    }

    pub fn mean_period(&self) -> usize {
        self.mean_period
    }

    pub fn spread_mean_period(&self) -> usize {
        self.spread_mean_period
    }

    pub fn spread_sdev_period(&self) -> usize {
        self.spread_sdev_period
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn calc_type(&self) -> CalcType {
        self.calc_type
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Copy with a different side; all other fields are already valid.
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Copy with a different estimator family.
    pub fn with_calc_type(mut self, calc_type: CalcType) -> Self {
        self.calc_type = calc_type;
        self
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            mean_period: DEFAULT_MEAN_PERIOD,
            spread_mean_period: DEFAULT_SPREAD_MEAN_PERIOD,
            spread_sdev_period: DEFAULT_SPREAD_SDEV_PERIOD,
            threshold: DEFAULT_THRESHOLD,
            calc_type: CalcType::Exponential,
            side: Side::Long,
        }
    }
}

impl fmt::Display for Hyperparameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}/{}/{}) z±{} {}",
            self.calc_type,
            self.mean_period,
            self.spread_mean_period,
            self.spread_sdev_period,
            self.threshold,
            self.side
        )
    }
}

/// Unvalidated hyperparameters. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperparameterInput {
    pub mean_period: Option<i64>,
    pub spread_mean_period: Option<i64>,
    pub spread_sdev_period: Option<i64>,
    pub threshold: Option<f64>,
    pub calc_type: Option<String>,
    pub side: Option<String>,
}

impl HyperparameterInput {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply defaults and validate.
    pub fn resolve(&self) -> Result<Hyperparameters, ConfigError> {
        let defaults = Hyperparameters::default();

        let threshold = match self.threshold {
            Some(t) if !t.is_finite() || t == 0.0 => return Err(ConfigError::InvalidThreshold(t)),
            Some(t) => t.abs(),
            None => defaults.threshold,
        };

        let calc_type = match self.calc_type.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => defaults.calc_type,
        };

        let side = match self.side.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => defaults.side,
        };

        Ok(Hyperparameters {
            mean_period: period("mean_period", self.mean_period, defaults.mean_period)?,
            spread_mean_period: period(
                "spread_mean_period",
                self.spread_mean_period,
                defaults.spread_mean_period,
            )?,
            spread_sdev_period: period(
                "spread_sdev_period",
                self.spread_sdev_period,
                defaults.spread_sdev_period,
            )?,
            threshold,
            calc_type,
            side,
        })
    }
}

fn period(field: &'static str, value: Option<i64>, default: usize) -> Result<usize, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if v <= 0 => Err(ConfigError::NonPositivePeriod { field, value: v }),
        Some(v) => Ok(v as usize),
    }
}

/// Capital base for converting cumulative log-returns into equity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Account {
    cash: f64,
}

impl Account {
    pub fn new(cash: f64) -> Result<Self, ConfigError> {
        if !cash.is_finite() || cash <= 0.0 {
            return Err(ConfigError::NonPositiveCash(cash));
        }
        Ok(Self { cash })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }
}

impl Default for Account {
    fn default() -> Self {
        Self { cash: DEFAULT_CASH }
    }
}
