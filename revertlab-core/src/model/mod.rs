//! Spread z-score signal model.
//!
//! Pipeline per run, all on the close series:
//! 1. log-return against the previous close
//! 2. rolling (or exponential) mean of close, spread = close - mean
//! 3. mean and deviation of the spread with the same estimator family
//! 4. z-score, undefined where the deviation is undefined or zero
//! 5. independent long/short latches, merged into one signal
//! 6. signal lagged one bar, multiplied into the log-return, masked by side
//!
//! # Look-ahead guard
//! The position held over bar t is the signal computed at bar t-1, so a
//! bar's own close never feeds its realized return through the signal.

pub mod frame;
pub mod latch;

pub use frame::{EquityRow, FrameRow, ModelFrame, SignalFrame, SignalRow};
pub use latch::{latch_positions, Direction, LatchState, PositionLatch};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::PriceSeries;
use crate::indicators::Estimator;
use crate::params::Hyperparameters;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("long and short latches both open at bar {index} ({date})")]
    ConflictingPositions {
        index: usize,
        date: chrono::NaiveDate,
    },
}

/// Build the signal frame for one price series.
pub fn build(prices: &PriceSeries, params: &Hyperparameters) -> Result<SignalFrame, ModelError> {
    let closes = prices.closes();
    let n = closes.len();
    let estimator = Estimator::new(params.calc_type());

    let log_returns = log_returns(&closes);

    let mean = estimator.mean(&closes, params.mean_period());
    let spread: Vec<f64> = closes.iter().zip(&mean).map(|(c, m)| c - m).collect();
    let spread_mean = estimator.mean(&spread, params.spread_mean_period());
    let spread_std = estimator.std(&spread, params.spread_sdev_period());

    let z_scores: Vec<Option<f64>> = (0..n)
        .map(|t| z_score(spread[t], spread_mean[t], spread_std[t]))
        .collect();

    let long = latch_positions(&z_scores, Direction::Long, params.threshold());
    let short = latch_positions(&z_scores, Direction::Short, params.threshold());

    let mut rows = Vec::with_capacity(n);
    let mut previous_signal = 0_i8;
    for (t, bar) in prices.bars().iter().enumerate() {
        if long[t] != 0 && short[t] != 0 {
            return Err(ModelError::ConflictingPositions {
                index: t,
                date: bar.date,
            });
        }
        let signal = long[t] + short[t];
        let position = previous_signal;
        let strategy_return = match log_returns[t] {
            Some(r) if position != 0 && params.side().allows(position) => f64::from(position) * r,
            _ => 0.0,
        };

        rows.push(SignalRow {
            date: bar.date,
            close: bar.close,
            log_return: log_returns[t],
            rolling_mean: defined(mean[t]),
            spread: defined(spread[t]),
            spread_mean: defined(spread_mean[t]),
            spread_std: defined(spread_std[t]),
            z_score: z_scores[t],
            long_position: long[t],
            short_position: short[t],
            signal,
            position,
            strategy_return,
        });
        previous_signal = signal;
    }

    let warmup_bars = z_scores.iter().take_while(|z| z.is_none()).count();
    debug!(
        bars = n,
        warmup_bars,
        params = %params,
        "signal frame built"
    );
    if n > 0 && warmup_bars == n {
        warn!(bars = n, params = %params, "no bar has a defined z-score; signal is flat");
    }

    Ok(SignalFrame {
        params: *params,
        rows,
        warmup_bars,
    })
}

/// `ln(close[t] / close[t-1])`, undefined at the first bar.
pub fn log_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(closes.len());
    for t in 0..closes.len() {
        if t == 0 {
            result.push(None);
        } else {
            result.push(defined((closes[t] / closes[t - 1]).ln()));
        }
    }
    result
}

/// Standardized spread; `None` when any input is undefined or the deviation is zero.
pub fn z_score(spread: f64, mean: f64, std: f64) -> Option<f64> {
    if spread.is_nan() || mean.is_nan() || std.is_nan() || std == 0.0 {
        return None;
    }
    defined((spread - mean) / std)
}

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
