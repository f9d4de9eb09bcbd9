//! Extreme-value detection and robustification of seasonal-irregular ratios.
//!
//! The corrector is used in three stages, each a separate type:
//! [`ExtremeValuesCorrector`] holds the sigma limits, [`analyse`] turns an
//! irregular series into an [`ExtremeValuesAnalysis`] with one weight per
//! observation, and [`ExtremeValuesAnalysis::compute_corrections`] produces
//! the replacement values used to robustify the SI ratios.
//! [`ExtremeValuesAnalysis::correction_factors`] measures, for the terminal
//! pass, how far each down-weighted observation lies from the line through
//! its full-weight neighbours of the same position.
//!
//! [`analyse`]: ExtremeValuesCorrector::analyse

use super::mode::ModeOps;
use super::spec::SigmaScope;
use crate::core::Series;
use crate::error::{Result, X11Error};
use crate::utils::{linear_fit_at, mean, median, robust_scale};
use tracing::debug;

/// Weight of an observation with standardized deviation `z`.
///
/// Full weight up to `lower`, zero from `upper` on, linear in between.
pub fn weight_for(z: f64, lower: f64, upper: f64) -> f64 {
    let z = z.abs();
    if z <= lower {
        1.0
    } else if z >= upper {
        0.0
    } else {
        (upper - z) / (upper - lower)
    }
}

/// Sigma-limit configuration of the extreme-value treatment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremeValuesCorrector {
    lower_sigma: f64,
    upper_sigma: f64,
    scope: SigmaScope,
}

impl ExtremeValuesCorrector {
    pub fn new(lower_sigma: f64, upper_sigma: f64, scope: SigmaScope) -> Self {
        Self {
            lower_sigma,
            upper_sigma,
            scope,
        }
    }

    pub fn lower_sigma(&self) -> f64 {
        self.lower_sigma
    }

    pub fn upper_sigma(&self) -> f64 {
        self.upper_sigma
    }

    pub fn scope(&self) -> SigmaScope {
        self.scope
    }

    /// Weight every observation of an irregular series.
    pub fn analyse(&self, irregular: &Series) -> ExtremeValuesAnalysis {
        let n = irregular.len();
        let values = irregular.values();
        let mut centers = vec![0.0; n];
        let mut scales = vec![0.0; n];
        let (pooled_center, pooled_scale) = location_scale(values);

        match self.scope {
            SigmaScope::Pooled => {
                centers.fill(pooled_center);
                scales.fill(pooled_scale.unwrap_or_else(|| scale_floor(pooled_center)));
            }
            SigmaScope::PerPosition => {
                for position in 0..irregular.period() {
                    let indices: Vec<usize> = irregular.indices_at(position).collect();
                    if indices.is_empty() {
                        continue;
                    }
                    let sub: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
                    let (c, s) = location_scale(&sub);
                    // A position without spread borrows the pooled scale.
                    let s = s.or(pooled_scale).unwrap_or_else(|| scale_floor(c));
                    for &i in &indices {
                        centers[i] = c;
                        scales[i] = s;
                    }
                }
            }
        }

        let weights: Vec<f64> = values
            .iter()
            .zip(centers.iter().zip(scales.iter()))
            .map(|(&x, (&c, &s))| weight_for((x - c) / s, self.lower_sigma, self.upper_sigma))
            .collect();

        let analysis = ExtremeValuesAnalysis {
            irregular: irregular.clone(),
            weights,
            scales,
        };
        debug!(
            extremes = analysis.extreme_count(),
            n,
            "extreme values analysed"
        );
        analysis
    }
}

/// Median and robust scale of a sample; the scale is `None` when it does
/// not exceed [`scale_floor`].
fn location_scale(values: &[f64]) -> (f64, Option<f64>) {
    let center = median(values);
    let scale = robust_scale(values, center);
    let scale = (scale.is_finite() && scale > scale_floor(center)).then_some(scale);
    (center, scale)
}

fn scale_floor(center: f64) -> f64 {
    if center.is_finite() {
        1e-9 * center.abs().max(1.0)
    } else {
        1e-9
    }
}

/// Weights assigned to an irregular series.
#[derive(Debug, Clone)]
pub struct ExtremeValuesAnalysis {
    irregular: Series,
    weights: Vec<f64>,
    scales: Vec<f64>,
}

impl ExtremeValuesAnalysis {
    /// Weight in [0, 1] of each observation.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights as a series aligned with the analysed irregular.
    pub fn weights_series(&self) -> Series {
        self.irregular.with_values(self.weights.clone())
    }

    /// Robust scale used for each observation.
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of observations with less than full weight.
    pub fn extreme_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w < 1.0).count()
    }

    /// Replacement values for the down-weighted observations of `si`.
    ///
    /// `si` must be aligned with the analysed irregular. Full-weight
    /// observations keep their value.
    pub fn compute_corrections(&self, si: &Series) -> Result<Corrections> {
        if si.len() != self.weights.len() {
            return Err(X11Error::DimensionMismatch {
                expected: self.weights.len(),
                got: si.len(),
            });
        }

        let values = si.values();
        let mut replacements = values.to_vec();
        let mut replaced = 0;
        for position in 0..si.period() {
            let indices: Vec<usize> = si.indices_at(position).collect();
            for (k, &i) in indices.iter().enumerate() {
                if self.weights[i] >= 1.0 {
                    continue;
                }
                replacements[i] = self.replacement(values, &indices, k);
                replaced += 1;
            }
        }

        Ok(Corrections {
            values: si.with_values(replacements),
            weights: self.weights.clone(),
            replaced,
        })
    }

    /// Nearest full-weight observations of the same position around
    /// `indices[k]`: two on each side, or the four nearest when one side has
    /// fewer than two. Returns ranks within `indices`.
    fn full_weight_neighbours(&self, indices: &[usize], k: usize) -> Vec<usize> {
        let full = |m: &usize| self.weights[indices[*m]] >= 1.0;
        let before: Vec<usize> = (0..k).rev().filter(full).collect();
        let after: Vec<usize> = (k + 1..indices.len()).filter(full).collect();

        if before.len() >= 2 && after.len() >= 2 {
            return before[..2].iter().chain(after[..2].iter()).copied().collect();
        }
        let mut nearest: Vec<(usize, usize)> = before
            .iter()
            .enumerate()
            .chain(after.iter().enumerate())
            .map(|(rank, &m)| (rank, m))
            .collect();
        nearest.sort_by_key(|&(rank, m)| (rank, m));
        nearest.into_iter().take(4).map(|(_, m)| m).collect()
    }

    /// Mean of the other values of the position, or the value itself when
    /// the position has a single observation.
    fn position_mean(values: &[f64], indices: &[usize], k: usize) -> f64 {
        let others: Vec<f64> = indices
            .iter()
            .enumerate()
            .filter(|&(m, _)| m != k)
            .map(|(_, &j)| values[j])
            .collect();
        if others.is_empty() {
            values[indices[k]]
        } else {
            mean(&others)
        }
    }

    /// Mean of the full-weight neighbours of `indices[k]`.
    fn replacement(&self, values: &[f64], indices: &[usize], k: usize) -> f64 {
        let chosen = self.full_weight_neighbours(indices, k);
        if chosen.is_empty() {
            return Self::position_mean(values, indices, k);
        }
        let picked: Vec<f64> = chosen.iter().map(|&m| values[indices[m]]).collect();
        mean(&picked)
    }

    /// Value of the line through the full-weight neighbours of `indices[k]`,
    /// indexed by cycle, at cycle `k`.
    ///
    /// Falls back to the neighbours' mean when the line is unusable, which
    /// includes a non-positive value for ratio components.
    fn trend_replacement(&self, values: &[f64], indices: &[usize], k: usize, positive: bool) -> f64 {
        let chosen = self.full_weight_neighbours(indices, k);
        if chosen.is_empty() {
            return Self::position_mean(values, indices, k);
        }
        let points: Vec<(f64, f64)> = chosen
            .iter()
            .map(|&m| (m as f64, values[indices[m]]))
            .collect();
        let fitted = linear_fit_at(&points, k as f64);
        if fitted.is_finite() && (!positive || fitted > 0.0) {
            fitted
        } else {
            mean(&points.iter().map(|p| p.1).collect::<Vec<_>>())
        }
    }

    /// Robustify `original` with `corrections`: w·x + (1 − w)·c.
    pub fn apply_corrections(&self, original: &Series, corrections: &Corrections) -> Result<Series> {
        if original.len() != corrections.values.len() {
            return Err(X11Error::DimensionMismatch {
                expected: corrections.values.len(),
                got: original.len(),
            });
        }
        let out = original
            .values()
            .iter()
            .zip(corrections.values.values())
            .zip(corrections.weights.iter())
            .map(|((&x, &c), &w)| w * x + (1.0 - w) * c)
            .collect();
        Ok(original.with_values(out))
    }

    /// Factors that take the down-weighted part out of `original`.
    ///
    /// A down-weighted observation is pulled towards the line through the
    /// full-weight observations of its position, by its missing weight:
    /// `remove(original, factor)` is `w·x + (1 − w)·line`. Full-weight
    /// observations get the neutral factor.
    pub fn correction_factors(&self, original: &Series, ops: &ModeOps) -> Result<Series> {
        if original.len() != self.weights.len() {
            return Err(X11Error::DimensionMismatch {
                expected: self.weights.len(),
                got: original.len(),
            });
        }

        let neutral = ops.neutral();
        let values = original.values();
        let mut factors = vec![neutral; values.len()];
        for position in 0..original.period() {
            let indices: Vec<usize> = original.indices_at(position).collect();
            for (k, &i) in indices.iter().enumerate() {
                let w = self.weights[i];
                if w >= 1.0 {
                    continue;
                }
                let line = self.trend_replacement(values, &indices, k, ops.is_multiplicative());
                let corrected = w * values[i] + (1.0 - w) * line;
                factors[i] = if ops.is_multiplicative() && corrected.abs() < 1e-12 {
                    neutral
                } else {
                    ops.correction_factor(values[i], corrected)
                };
            }
        }
        Ok(original.with_values(factors))
    }
}

/// Replacement values computed from an analysis.
#[derive(Debug, Clone)]
pub struct Corrections {
    values: Series,
    weights: Vec<f64>,
    replaced: usize,
}

impl Corrections {
    /// Replacement value for each observation (the value itself at full weight).
    pub fn values(&self) -> &Series {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of observations that received a replacement.
    pub fn replaced_count(&self) -> usize {
        self.replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x11::mode::DecompositionMode;
    use approx::assert_relative_eq;

    fn corrector() -> ExtremeValuesCorrector {
        ExtremeValuesCorrector::new(1.5, 2.5, SigmaScope::Pooled)
    }

    fn noisy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 0.3 * ((t as f64) * 1.7).sin() + 0.2 * ((t as f64) * 0.37).cos())
            .collect()
    }

    #[test]
    fn weight_is_monotone_and_bounded() {
        let mut last = 1.0;
        for k in 0..100 {
            let w = weight_for(k as f64 * 0.05, 1.5, 2.5);
            assert!((0.0..=1.0).contains(&w));
            assert!(w <= last);
            last = w;
        }
        assert_eq!(weight_for(-1.0, 1.5, 2.5), 1.0);
        assert_relative_eq!(weight_for(2.0, 1.5, 2.5), 0.5);
        assert_eq!(weight_for(3.0, 1.5, 2.5), 0.0);
    }

    #[test]
    fn ten_sigma_outlier_gets_zero_weight() {
        let mut values = noisy(48);
        let base = Series::monthly(values.clone());
        let sigma = corrector().analyse(&base).scales()[0];
        values[20] += 10.0 * sigma;
        let analysis = corrector().analyse(&Series::monthly(values));
        assert_eq!(analysis.weights()[20], 0.0);
        assert!(analysis.extreme_count() >= 1);
    }

    #[test]
    fn per_position_scope_uses_position_samples() {
        // Position 0 is noisy, position 1 is quiet; the same deviation is
        // extreme only in the quiet position.
        let mut values = Vec::new();
        for t in 0..20 {
            values.push(if t % 2 == 0 { 5.0 } else { -5.0 });
            values.push(if t % 2 == 0 { 0.01 } else { -0.01 });
        }
        values[20] = 1.0;
        values[21] = 1.0;
        let series = Series::new(values, 2, 0).unwrap();
        let analysis =
            ExtremeValuesCorrector::new(1.5, 2.5, SigmaScope::PerPosition).analyse(&series);
        assert_eq!(analysis.weights()[20], 1.0);
        assert_eq!(analysis.weights()[21], 0.0);
    }

    #[test]
    fn replacement_uses_nearest_full_weight_neighbours() {
        let mut values = vec![1.0; 20];
        let pattern = [1.0, 2.0, 3.0, 4.0, 100.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        for (k, v) in pattern.iter().enumerate() {
            values[2 * k] = *v;
        }
        let si = Series::new(values, 2, 0).unwrap();
        let analysis = ExtremeValuesAnalysis {
            irregular: si.clone(),
            weights: (0..20).map(|i| if i == 8 { 0.0 } else { 1.0 }).collect(),
            scales: vec![1.0; 20],
        };
        let corrections = analysis.compute_corrections(&si).unwrap();
        assert_eq!(corrections.replaced_count(), 1);
        assert_relative_eq!(corrections.values().values()[8], (3.0 + 4.0 + 5.0 + 6.0) / 4.0);
        assert_eq!(corrections.values().values()[6], 4.0);

        let robust = analysis.apply_corrections(&si, &corrections).unwrap();
        assert_relative_eq!(robust.values()[8], 4.5);
        assert_eq!(robust.values()[10], 5.0);
    }

    #[test]
    fn replacement_near_the_edge_takes_four_nearest() {
        let values = vec![50.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let si = Series::new(values, 1, 0).unwrap();
        let analysis = ExtremeValuesAnalysis {
            irregular: si.clone(),
            weights: vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            scales: vec![1.0; 6],
        };
        let corrections = analysis.compute_corrections(&si).unwrap();
        assert_relative_eq!(corrections.values().values()[0], 2.5);
    }

    #[test]
    fn replacement_without_full_weight_neighbours() {
        let si = Series::new(vec![2.0, 4.0, 9.0], 1, 0).unwrap();
        let analysis = ExtremeValuesAnalysis {
            irregular: si.clone(),
            weights: vec![0.0, 0.0, 0.5],
            scales: vec![1.0; 3],
        };
        let corrections = analysis.compute_corrections(&si).unwrap();
        assert_relative_eq!(corrections.values().values()[0], 6.5);
        assert_relative_eq!(corrections.values().values()[2], 3.0);
    }

    #[test]
    fn correction_factors_follow_the_position_line() {
        // Period 1: a ramp with a spike at t = 4.
        let mut values: Vec<f64> = (0..9).map(|t| 10.0 + 2.0 * t as f64).collect();
        values[4] += 30.0;
        let original = Series::new(values, 1, 0).unwrap();
        let mut weights = vec![1.0; 9];
        weights[4] = 0.0;
        weights[6] = 0.5;
        let analysis = ExtremeValuesAnalysis {
            irregular: original.clone(),
            weights,
            scales: vec![1.0; 9],
        };

        let add = analysis
            .correction_factors(&original, &DecompositionMode::Additive.ops())
            .unwrap();
        assert_relative_eq!(add.values()[4], 30.0, epsilon = 1e-9);
        assert_eq!(add.values()[0], 0.0);
        // Half weight against neighbours 3, 5, 7, 8 that lie on the ramp.
        assert_relative_eq!(add.values()[6], 0.0, epsilon = 1e-9);

        let ops = DecompositionMode::Multiplicative.ops();
        let mult = analysis.correction_factors(&original, &ops).unwrap();
        assert_relative_eq!(mult.values()[4], 48.0 / 18.0, epsilon = 1e-9);
        assert_eq!(mult.values()[2], 1.0);
        for (i, f) in mult.values().iter().enumerate() {
            let cleaned = ops.remove(original.values()[i], *f);
            let expected = if i == 4 { 18.0 } else { original.values()[i] };
            assert_relative_eq!(cleaned, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn correction_factors_at_the_edge_extrapolate() {
        let mut values: Vec<f64> = (0..6).map(|t| 5.0 + t as f64).collect();
        values[0] = 40.0;
        let original = Series::new(values, 1, 0).unwrap();
        let analysis = ExtremeValuesAnalysis {
            irregular: original.clone(),
            weights: vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            scales: vec![1.0; 6],
        };
        let add = analysis
            .correction_factors(&original, &DecompositionMode::Additive.ops())
            .unwrap();
        assert_relative_eq!(add.values()[0], 35.0, epsilon = 1e-9);
        assert!(analysis
            .correction_factors(&Series::monthly(noisy(12)), &DecompositionMode::Additive.ops())
            .is_err());
    }

    #[test]
    fn constant_irregular_keeps_full_weight() {
        let flat = Series::monthly(vec![1.0; 36]);
        for scope in [SigmaScope::Pooled, SigmaScope::PerPosition] {
            let analysis = ExtremeValuesCorrector::new(1.5, 2.5, scope).analyse(&flat);
            assert!(analysis.scales().iter().all(|s| s.is_finite() && *s > 0.0));
            assert!(analysis.weights().iter().all(|&w| w == 1.0));
            assert_eq!(analysis.extreme_count(), 0);
        }
    }

    #[test]
    fn flat_position_borrows_the_pooled_scale() {
        // Position 0 never moves; the other positions carry the spread.
        let noise = noisy(40);
        let values: Vec<f64> = (0..40).map(|t| if t % 4 == 0 { 0.0 } else { noise[t] }).collect();
        let series = Series::new(values, 4, 0).unwrap();
        let pooled = ExtremeValuesCorrector::new(1.5, 2.5, SigmaScope::Pooled).analyse(&series);
        let analysis =
            ExtremeValuesCorrector::new(1.5, 2.5, SigmaScope::PerPosition).analyse(&series);
        assert_relative_eq!(analysis.scales()[0], pooled.scales()[0]);
        assert!(analysis.scales()[0] > 0.1);
        assert!(analysis.scales()[2] > analysis.scales()[0]);
        assert!(analysis.weights().iter().step_by(4).all(|&w| w == 1.0));
    }

    #[test]
    fn misaligned_series_are_rejected() {
        let analysis = corrector().analyse(&Series::monthly(noisy(24)));
        assert!(analysis
            .compute_corrections(&Series::monthly(noisy(12)))
            .is_err());
    }
}
