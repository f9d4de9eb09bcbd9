//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the median of a slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Third quartile of the standard normal, the MAD consistency constant.
pub fn normal_mad_constant() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(0.75))
        .unwrap_or(0.674_489_750_196_081_7)
}

/// Croux & Rousseeuw small-sample correction for the MAD.
///
/// # Arguments
/// * `n` - Number of observations the MAD was computed from.
pub fn mad_small_sample_factor(n: usize) -> f64 {
    match n {
        0 | 1 => 1.0,
        2 => 1.196,
        3 => 1.495,
        4 => 1.363,
        5 => 1.206,
        6 => 1.200,
        7 => 1.140,
        8 => 1.129,
        9 => 1.107,
        _ => n as f64 / (n as f64 - 0.8),
    }
}

/// Robust scale estimate around `center`.
///
/// Median absolute deviation, rescaled to be consistent for the normal
/// standard deviation and corrected for small samples.
pub fn robust_scale(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let deviations: Vec<f64> = values.iter().map(|x| (x - center).abs()).collect();
    median(&deviations) / normal_mad_constant() * mad_small_sample_factor(values.len())
}

/// Mean absolute period-to-period change.
///
/// With `relative` set, changes are measured as |x[t] / x[t-lag] - 1|, which
/// is how variability is compared for multiplicative components.
pub fn mean_abs_change(values: &[f64], lag: usize, relative: bool) -> f64 {
    if lag == 0 || values.len() <= lag {
        return 0.0;
    }
    let total: f64 = values
        .windows(lag + 1)
        .map(|w| {
            let (prev, cur) = (w[0], w[lag]);
            if relative {
                if prev.abs() < f64::EPSILON {
                    0.0
                } else {
                    (cur / prev - 1.0).abs()
                }
            } else {
                (cur - prev).abs()
            }
        })
        .sum();
    total / (values.len() - lag) as f64
}

/// Least-squares line through `points`, evaluated at `at`.
///
/// A single point gives a constant; an empty slice or points sharing one
/// abscissa give NaN.
pub fn linear_fit_at(points: &[(f64, f64)], at: f64) -> f64 {
    match points.len() {
        0 => f64::NAN,
        1 => points[0].1,
        n => {
            let mx = points.iter().map(|p| p.0).sum::<f64>() / n as f64;
            let my = points.iter().map(|p| p.1).sum::<f64>() / n as f64;
            let sxx: f64 = points.iter().map(|p| (p.0 - mx).powi(2)).sum();
            if sxx <= 0.0 {
                return f64::NAN;
            }
            let sxy: f64 = points.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
            my + sxy / sxx * (at - mx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(mean(&[10.0]), 10.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn median_calculates_correctly() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5, epsilon = 1e-10);
        assert_relative_eq!(median(&[5.0, 1.0, 3.0, 2.0, 4.0]), 3.0, epsilon = 1e-10);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn mad_constant_matches_normal_quartile() {
        assert_relative_eq!(normal_mad_constant(), 0.6745, epsilon = 1e-4);
    }

    #[test]
    fn small_sample_factor_approaches_one() {
        assert_relative_eq!(mad_small_sample_factor(5), 1.206);
        assert!(mad_small_sample_factor(10) > 1.0);
        assert!(mad_small_sample_factor(1000) < 1.001);
    }

    #[test]
    fn robust_scale_ignores_single_outlier() {
        let clean = [-1.0, -0.5, 0.0, 0.5, 1.0, -0.2, 0.3, 0.1, -0.4];
        let mut dirty = clean;
        dirty[4] = 1000.0;
        let s_clean = robust_scale(&clean, 0.0);
        let s_dirty = robust_scale(&dirty, 0.0);
        assert!(s_dirty < 2.0 * s_clean);
    }

    #[test]
    fn mean_abs_change_additive_and_relative() {
        let v = [1.0, 2.0, 4.0];
        assert_relative_eq!(mean_abs_change(&v, 1, false), 1.5, epsilon = 1e-12);
        assert_relative_eq!(mean_abs_change(&v, 1, true), 1.0, epsilon = 1e-12);
        assert_eq!(mean_abs_change(&v, 3, false), 0.0);
    }

    #[test]
    fn linear_fit_interpolates_and_extrapolates_lines() {
        let points = [(0.0, 1.0), (1.0, 3.0), (3.0, 7.0), (4.0, 9.0)];
        assert_relative_eq!(linear_fit_at(&points, 2.0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(linear_fit_at(&points[1..], -1.0), -1.0, epsilon = 1e-12);
        assert_eq!(linear_fit_at(&[(2.0, 4.0)], 10.0), 4.0);
        assert!(linear_fit_at(&[], 0.0).is_nan());
        assert!(linear_fit_at(&[(1.0, 2.0), (1.0, 3.0)], 0.0).is_nan());
    }
}
