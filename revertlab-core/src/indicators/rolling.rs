//! Trailing-window mean and sample standard deviation.
//!
//! Output at index t covers `values[t+1-window..=t]`. Undefined (NaN) until
//! `window` observations are available, and wherever the window contains NaN.
//! Sums are taken relative to the window's first value, so a flat window
//! yields its exact value and an exactly zero deviation.

/// Rolling arithmetic mean.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for t in (window - 1)..n {
        result[t] = window_mean(&values[t + 1 - window..=t]);
    }
    result
}

/// Rolling sample standard deviation (ddof = 1).
///
/// A window of length 1 has no sample deviation and stays NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }

    for t in (window - 1)..n {
        let slice = &values[t + 1 - window..=t];
        let mean = window_mean(slice);
        if mean.is_nan() {
            continue;
        }
        let ss: f64 = slice.iter().map(|v| (v - mean).powi(2)).sum();
        result[t] = (ss / (window - 1) as f64).sqrt();
    }
    result
}

fn window_mean(slice: &[f64]) -> f64 {
    if slice.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let anchor = slice[0];
    let offset: f64 = slice.iter().map(|v| v - anchor).sum();
    anchor + offset / slice.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_5_basic() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        assert_eq!(result.len(), 7);
        for v in result.iter().take(4) {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_window_1_is_identity() {
        let result = rolling_mean(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn mean_nan_propagation() {
        let result = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn too_few_values_is_all_nan() {
        assert!(rolling_mean(&[10.0, 11.0], 5).iter().all(|v| v.is_nan()));
        assert!(rolling_std(&[10.0, 11.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn flat_window_is_exact() {
        let values = vec![100.1; 6];
        let mean = rolling_mean(&values, 3);
        let std = rolling_std(&values, 3);
        assert_eq!(mean[5], 100.1);
        assert_eq!(std[5], 0.0);
    }

    #[test]
    fn std_known_values() {
        // Sample std of (2, 4, 4, 4, 5, 5, 7, 9) = sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&values, 8);
        assert_approx(result[7], (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn std_window_1_is_undefined() {
        assert!(rolling_std(&[1.0, 2.0, 3.0], 1).iter().all(|v| v.is_nan()));
    }
}
