//! Exponentially weighted mean and standard deviation.
//!
//! Span-parameterized: alpha = 2 / (span + 1). Weights are normalized by the
//! cumulative weight actually seen (the "adjusted" form), so early values are
//! not biased toward the first observation:
//!
//!   mean[t] = Σ (1-α)^i · x[t-i] / Σ (1-α)^i
//!
//! The standard deviation is the bias-corrected weighted sample deviation:
//!   var[t] = biased_var[t] · (Σw)² / ((Σw)² - Σw²)
//!
//! Leading NaNs are skipped; the mean starts at the first observation. A NaN
//! after the start still decays the weights of earlier observations.

/// Exponentially weighted moving average with the given span.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }
    let decay = decay_factor(span);

    let mut weighted = f64::NAN;
    let mut old_wt = 1.0;
    for (t, &x) in values.iter().enumerate() {
        let is_obs = !x.is_nan();
        if !weighted.is_nan() {
            old_wt *= decay;
            if is_obs {
                if weighted != x {
                    weighted = (old_wt * weighted + x) / (old_wt + 1.0);
                }
                old_wt += 1.0;
            }
        } else if is_obs {
            weighted = x;
        }
        result[t] = weighted;
    }
    result
}

/// Bias-corrected exponentially weighted standard deviation with the given span.
///
/// Undefined until two observations have been seen.
pub fn ewm_std(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }
    let decay = decay_factor(span);

    let mut mean = f64::NAN;
    let mut cov = 0.0;
    let mut sum_wt = 1.0;
    let mut sum_wt2 = 1.0;
    let mut old_wt = 1.0;

    for (t, &x) in values.iter().enumerate() {
        let is_obs = !x.is_nan();
        if !mean.is_nan() {
            sum_wt *= decay;
            sum_wt2 *= decay * decay;
            old_wt *= decay;
            if is_obs {
                let old_mean = mean;
                if mean != x {
                    mean = (old_wt * old_mean + x) / (old_wt + 1.0);
                }
                cov = (old_wt * (cov + (old_mean - mean).powi(2)) + (x - mean).powi(2))
                    / (old_wt + 1.0);
                sum_wt += 1.0;
                sum_wt2 += 1.0;
                old_wt += 1.0;
            }
        } else if is_obs {
            mean = x;
        }

        if !mean.is_nan() {
            let numerator = sum_wt * sum_wt;
            let denominator = numerator - sum_wt2;
            if denominator > 0.0 {
                result[t] = (numerator / denominator * cov).max(0.0).sqrt();
            }
        }
    }
    result
}

fn decay_factor(span: usize) -> f64 {
    let alpha = 2.0 / (span as f64 + 1.0);
    1.0 - alpha
}
