//! Series estimators used by the signal model.
//!
//! Estimators are pure functions: a value series in, a series of the same
//! length out, NaN where the statistic is not yet (or not at all) defined.
//! No output at index t depends on input after t.

pub mod ewm;
pub mod rolling;

pub use ewm::{ewm_mean, ewm_std};
pub use rolling::{rolling_mean, rolling_std};

use crate::params::CalcType;

/// Estimator family selected by [`CalcType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimator {
    calc_type: CalcType,
}

impl Estimator {
    pub fn new(calc_type: CalcType) -> Self {
        Self { calc_type }
    }

    /// Mean over a window (simple) or span (exponential) of `period`.
    pub fn mean(&self, values: &[f64], period: usize) -> Vec<f64> {
        match self.calc_type {
            CalcType::Simple => rolling_mean(values, period),
            CalcType::Exponential => ewm_mean(values, period),
        }
    }

    /// Sample standard deviation over a window or span of `period`.
    pub fn std(&self, values: &[f64], period: usize) -> Vec<f64> {
        match self.calc_type {
            CalcType::Simple => rolling_std(values, period),
            CalcType::Exponential => ewm_std(values, period),
        }
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for estimator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_dispatches_on_calc_type() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let simple = Estimator::new(CalcType::Simple);
        let exp = Estimator::new(CalcType::Exponential);

        assert!(simple.mean(&values, 3)[1].is_nan());
        assert!(!exp.mean(&values, 3)[1].is_nan());
        assert_approx(simple.mean(&values, 3)[3], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn no_estimator_looks_ahead() {
        // Truncated-vs-full series: values up to t must not change when later
        // inputs change.
        let full = [5.0, 7.0, 6.0, 9.0, 4.0, 8.0, 10.0];
        let mut altered = full;
        altered[5] = 100.0;
        altered[6] = -3.0;

        for calc in CalcType::ALL {
            let est = Estimator::new(calc);
            let a = est.mean(&full, 3);
            let b = est.mean(&altered, 3);
            let sa = est.std(&full, 3);
            let sb = est.std(&altered, 3);
            for t in 0..5 {
                assert!(a[t].to_bits() == b[t].to_bits(), "{calc} mean changed at {t}");
                assert!(sa[t].to_bits() == sb[t].to_bits(), "{calc} std changed at {t}");
            }
        }
    }
}
