//! Return/equity simulator.
//!
//! Turns the realized strategy returns of a [`SignalFrame`] into an equity
//! path. Returns are log-domain and summed, not compounded:
//!
//!   cumulative[t] = Σ_{i<=t} strategy_return[i]
//!   equity[t]     = cash · (1 + cumulative[t])
//!   peak[t]       = max(equity[0..=t])
//!   drawdown[t]   = (equity[t] - peak[t]) / peak[t] · 100

use crate::model::{EquityRow, FrameRow, ModelFrame, SignalFrame};
use crate::params::Account;

/// Running equity state across bars.
#[derive(Debug, Clone)]
pub struct EquityTracker {
    cash: f64,
    cumulative_return: f64,
    peak_equity: f64,
}

impl EquityTracker {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            cumulative_return: 0.0,
            peak_equity: f64::NEG_INFINITY,
        }
    }

    /// Apply one bar's strategy return and record the resulting equity point.
    pub fn step(&mut self, strategy_return: f64) -> EquityRow {
        self.cumulative_return += strategy_return;
        let equity = self.cash * (1.0 + self.cumulative_return);
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        let drawdown_pct = drawdown_pct(equity, self.peak_equity);
        EquityRow {
            cumulative_return: self.cumulative_return,
            equity,
            peak_equity: self.peak_equity,
            drawdown_pct,
        }
    }
}

/// Attach the equity path to a signal frame.
pub fn simulate(frame: SignalFrame, account: &Account) -> ModelFrame {
    let cash = account.cash();
    let mut tracker = EquityTracker::new(cash);
    let rows = frame
        .rows
        .into_iter()
        .map(|signal| {
            let equity = tracker.step(signal.strategy_return);
            FrameRow { signal, equity }
        })
        .collect();

    ModelFrame {
        params: frame.params,
        cash,
        warmup_bars: frame.warmup_bars,
        rows,
    }
}

/// Percent below peak. Zero at a new peak; zero when the peak is not positive.
pub fn drawdown_pct(equity: f64, peak: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    ((equity - peak) / peak * 100.0).min(0.0)
}
