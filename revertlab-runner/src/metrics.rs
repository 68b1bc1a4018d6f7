//! Performance metrics — pure functions over realized strategy returns.
//!
//! Every metric is a pure function: return series (and dates) in, scalar or
//! table out. `MetricsSnapshot::summarize` assembles them for one run.
//!
//! Sharpe uses only traded periods (non-zero strategy return) and a fixed
//! annual risk-free rate. Undefined statistics are reported as NaN.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use revertlab_core::ModelFrame;

/// Annual risk-free rate subtracted (per period) in the Sharpe ratio.
pub const RISK_FREE_RATE: f64 = 0.05;

/// Trading periods per year used to de-annualize the risk-free rate and
/// annualize the Sharpe ratio.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Summed strategy return for one calendar year, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualReturn {
    pub year: i32,
    pub return_pct: f64,
}

/// Summed strategy return for one calendar month, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

/// Aggregate statistics for one run. Computed once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cash: f64,
    pub net_return_pct: f64,
    pub final_equity: f64,
    pub peak_equity: f64,
    /// Largest percent decline from a running peak, as a positive number.
    pub max_drawdown_pct: f64,
    /// Mean across calendar years of each year's summed return, in percent.
    pub annual_mean_return_pct: f64,
    pub daily_sharpe: f64,
    pub annual_sharpe: f64,
    /// Periods with a non-zero realized return.
    pub traded_periods: usize,
    pub annual_returns: Vec<AnnualReturn>,
    pub monthly_returns: Vec<MonthlyReturn>,
}

impl MetricsSnapshot {
    /// Summarize a completed frame against a capital base.
    pub fn summarize(frame: &ModelFrame, cash: f64) -> Self {
        let returns = frame.strategy_returns();
        let dates = frame.dates();

        let (daily_sharpe, annual_sharpe) = sharpe_ratios(&returns, RISK_FREE_RATE);
        let annual = annual_returns(&dates, &returns);

        Self {
            cash,
            net_return_pct: net_return_pct(&returns),
            final_equity: final_equity(&returns, cash),
            peak_equity: peak_equity(&frame.equity_curve(), cash),
            max_drawdown_pct: max_drawdown_pct(&frame.drawdowns()),
            annual_mean_return_pct: annual_mean_return_pct(&annual),
            daily_sharpe,
            annual_sharpe,
            traded_periods: traded_returns(&returns).len(),
            annual_returns: annual
                .into_iter()
                .map(|(year, return_pct)| AnnualReturn { year, return_pct })
                .collect(),
            monthly_returns: monthly_returns(&dates, &returns)
                .into_iter()
                .map(|((year, month), return_pct)| MonthlyReturn {
                    year,
                    month,
                    return_pct,
                })
                .collect(),
        }
    }

    /// True when the Sharpe ratio could be computed.
    pub fn has_sharpe(&self) -> bool {
        self.annual_sharpe.is_finite()
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of strategy log-returns, in percent.
pub fn net_return_pct(returns: &[f64]) -> f64 {
    total_return(returns) * 100.0
}

/// `cash · (1 + Σ returns)`.
pub fn final_equity(returns: &[f64], cash: f64) -> f64 {
    cash * (1.0 + total_return(returns))
}

/// Highest value of the equity column; `cash` when the column is empty.
pub fn peak_equity(equity_curve: &[f64], cash: f64) -> f64 {
    equity_curve.iter().copied().reduce(f64::max).unwrap_or(cash)
}

/// Maximum drawdown from a precomputed drawdown column.
pub fn max_drawdown_pct(drawdowns: &[f64]) -> f64 {
    drawdowns.iter().copied().fold(0.0_f64, f64::min).abs()
}

/// Returns of periods in the market (non-zero realized return).
pub fn traded_returns(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|r| *r != 0.0).collect()
}

/// Daily and annualized Sharpe over traded periods.
///
/// daily = (mean - rf / 252) / sample_std, annual = daily · sqrt(252).
/// NaN for both when there are fewer than two traded periods or zero deviation.
pub fn sharpe_ratios(returns: &[f64], risk_free_rate: f64) -> (f64, f64) {
    let traded = traded_returns(returns);
    let std = std_dev(&traded);
    if !std.is_finite() || std == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let daily = (mean_f64(&traded) - risk_free_rate / PERIODS_PER_YEAR) / std;
    (daily, daily * PERIODS_PER_YEAR.sqrt())
}

/// Summed returns per calendar year, in percent.
pub fn annual_returns(dates: &[NaiveDate], returns: &[f64]) -> BTreeMap<i32, f64> {
    let mut by_year = BTreeMap::new();
    for (date, r) in dates.iter().zip(returns) {
        *by_year.entry(date.year()).or_insert(0.0) += r * 100.0;
    }
    by_year
}

/// Summed returns per (year, month), in percent.
pub fn monthly_returns(dates: &[NaiveDate], returns: &[f64]) -> BTreeMap<(i32, u32), f64> {
    let mut by_month = BTreeMap::new();
    for (date, r) in dates.iter().zip(returns) {
        *by_month.entry((date.year(), date.month())).or_insert(0.0) += r * 100.0;
    }
    by_month
}

/// Mean of per-year sums; NaN with no years.
pub fn annual_mean_return_pct(annual: &BTreeMap<i32, f64>) -> f64 {
    if annual.is_empty() {
        return f64::NAN;
    }
    annual.values().sum::<f64>() / annual.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Sum starting at +0.0; `Iterator::sum` of an empty f64 slice is -0.0.
fn total_return(returns: &[f64]) -> f64 {
    returns.iter().fold(0.0, |acc, r| acc + r)
}

/// Arithmetic mean; NaN for an empty slice.
pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); NaN below two values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
