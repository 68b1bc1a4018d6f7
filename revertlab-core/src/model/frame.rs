//! Derived per-bar tables produced by a run.
//!
//! `SignalFrame` is the signal model's output. The simulator consumes it and
//! produces the final `ModelFrame` with the equity path attached. Neither is
//! mutated after construction.

use chrono::NaiveDate;
use serde::Serialize;

use crate::params::Hyperparameters;

/// One bar of the signal model.
///
/// `None` marks a statistic that is undefined at this bar (warm-up, first bar,
/// or zero spread volatility).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub log_return: Option<f64>,
    pub rolling_mean: Option<f64>,
    pub spread: Option<f64>,
    pub spread_mean: Option<f64>,
    pub spread_std: Option<f64>,
    pub z_score: Option<f64>,
    pub long_position: i8,
    pub short_position: i8,
    /// Merged latch output at this bar (not yet actionable).
    pub signal: i8,
    /// Position held over this bar: the previous bar's signal.
    pub position: i8,
    /// Realized log-return after side masking; 0 when flat or masked.
    pub strategy_return: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalFrame {
    pub(crate) params: Hyperparameters,
    pub(crate) rows: Vec<SignalRow>,
    pub(crate) warmup_bars: usize,
}

impl SignalFrame {
    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    /// Leading bars without a defined z-score.
    pub fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signals(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn z_scores(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.z_score).collect()
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strategy_return).collect()
    }
}

/// Equity path columns for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityRow {
    /// Running sum of strategy log-returns (not compounded).
    pub cumulative_return: f64,
    pub equity: f64,
    pub peak_equity: f64,
    /// Percent below the running peak; always <= 0.
    pub drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRow {
    #[serde(flatten)]
    pub signal: SignalRow,
    #[serde(flatten)]
    pub equity: EquityRow,
}

/// Complete per-bar result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ModelFrame {
    pub(crate) params: Hyperparameters,
    pub(crate) cash: f64,
    pub(crate) warmup_bars: usize,
    pub(crate) rows: Vec<FrameRow>,
}

impl ModelFrame {
    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    /// Capital base the equity path was computed from.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }

    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.signal.date).collect()
    }

    pub fn z_scores(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.signal.z_score).collect()
    }

    pub fn signals(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.signal.signal).collect()
    }

    pub fn positions(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.signal.position).collect()
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.signal.strategy_return).collect()
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.equity.equity).collect()
    }

    pub fn drawdowns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.equity.drawdown_pct).collect()
    }

    /// Equity after the last bar, or the starting cash for an empty frame.
    pub fn final_equity(&self) -> f64 {
        self.rows.last().map_or(self.cash, |r| r.equity.equity)
    }

    /// Number of bars with a non-zero position held.
    pub fn bars_in_market(&self) -> usize {
        self.rows.iter().filter(|r| r.signal.position != 0).count()
    }
}
