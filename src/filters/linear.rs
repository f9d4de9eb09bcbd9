//! Finite linear filters: symmetric moving averages and asymmetric end filters.

use crate::error::{Result, ValidationError, X11Error};

/// An immutable symmetric filter of odd length.
///
/// The weight at index `drop()` applies to the centre observation. Applying
/// the filter to `n` values yields `n - 2 * drop()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricFilter {
    weights: Vec<f64>,
}

impl SymmetricFilter {
    /// Create a symmetric filter from its full weight vector.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() || weights.len() % 2 == 0 {
            return Err(ValidationError::InvalidParameter(format!(
                "symmetric filter needs an odd number of weights, got {}",
                weights.len()
            ))
            .into());
        }
        let n = weights.len();
        for i in 0..n / 2 {
            let (a, b) = (weights[i], weights[n - 1 - i]);
            if (a - b).abs() > 1e-12 * a.abs().max(b.abs()).max(1.0) {
                return Err(ValidationError::InvalidParameter(format!(
                    "filter weights are not symmetric at offset {}",
                    n / 2 - i
                ))
                .into());
            }
        }
        Ok(Self { weights })
    }

    /// Filter from a published table that is symmetric by construction.
    pub(crate) fn from_table(weights: Vec<f64>) -> Self {
        debug_assert!(weights.len() % 2 == 1);
        Self { weights }
    }

    /// Centred moving average spanning one annual cycle.
    ///
    /// For an even period this is the 2×P moving average (P + 1 terms, half
    /// weight at both ends); for an odd period the simple P-term average.
    pub fn centered_moving_average(period: usize) -> Self {
        let period = period.max(1);
        if period % 2 == 0 {
            let mut weights = vec![1.0 / period as f64; period + 1];
            weights[0] = 0.5 / period as f64;
            weights[period] = 0.5 / period as f64;
            Self { weights }
        } else {
            Self {
                weights: vec![1.0 / period as f64; period],
            }
        }
    }

    pub fn length(&self) -> usize {
        self.weights.len()
    }

    /// Half-length: number of observations lost at each end.
    pub fn drop(&self) -> usize {
        self.weights.len() / 2
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight applied at `offset` from the centre.
    pub fn weight(&self, offset: isize) -> f64 {
        let idx = self.drop() as isize + offset;
        if idx < 0 || idx as usize >= self.weights.len() {
            0.0
        } else {
            self.weights[idx as usize]
        }
    }

    /// Filtered value centred on `index`. The window must fit in `input`.
    pub fn apply_at(&self, input: &[f64], index: usize) -> f64 {
        let start = index - self.drop();
        self.weights
            .iter()
            .zip(&input[start..start + self.weights.len()])
            .map(|(w, x)| w * x)
            .sum()
    }

    /// Convolve over every position where the full window fits.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let len = self.weights.len();
        if input.len() < len {
            return Vec::new();
        }
        input
            .windows(len)
            .map(|w| self.weights.iter().zip(w).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Convolve into `out`, which must hold `input.len() - 2 * drop()` values.
    pub fn apply_into(&self, input: &[f64], out: &mut [f64]) -> Result<()> {
        let expected = input.len().saturating_sub(2 * self.drop());
        if input.len() < self.weights.len() || out.len() != expected {
            return Err(X11Error::DimensionMismatch {
                expected,
                got: out.len(),
            });
        }
        for (slot, window) in out.iter_mut().zip(input.windows(self.weights.len())) {
            *slot = self.weights.iter().zip(window).map(|(a, b)| a * b).sum();
        }
        Ok(())
    }
}

/// A filter with explicit support `[lower_bound, lower_bound + len)`
/// relative to the target observation.
#[derive(Debug, Clone, PartialEq)]
pub struct FiniteFilter {
    lower_bound: isize,
    weights: Vec<f64>,
}

impl FiniteFilter {
    pub fn new(lower_bound: isize, weights: Vec<f64>) -> Self {
        Self {
            lower_bound,
            weights,
        }
    }

    pub fn lower_bound(&self) -> isize {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> isize {
        self.lower_bound + self.weights.len() as isize - 1
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Same filter seen from the other end of the series.
    pub fn mirror(&self) -> Self {
        let mut weights = self.weights.clone();
        weights.reverse();
        Self {
            lower_bound: -self.upper_bound(),
            weights,
        }
    }

    /// Filtered value for `index`; the support must fit in `input`.
    pub fn apply_at(&self, input: &[f64], index: usize) -> f64 {
        let start = (index as isize + self.lower_bound) as usize;
        self.weights
            .iter()
            .zip(&input[start..start + self.weights.len()])
            .map(|(w, x)| w * x)
            .sum()
    }
}

/// Apply a symmetric filter over the full input, using `right_ends[d]` for
/// the observation with `d` future values available and its mirror image at
/// the start of the series.
pub fn apply_with_end_filters(
    filter: &SymmetricFilter,
    right_ends: &[FiniteFilter],
    input: &[f64],
) -> Result<Vec<f64>> {
    let n = input.len();
    let h = filter.drop();
    if n < filter.length() {
        return Err(X11Error::DimensionMismatch {
            expected: filter.length(),
            got: n,
        });
    }
    if right_ends.len() != h {
        return Err(X11Error::DimensionMismatch {
            expected: h,
            got: right_ends.len(),
        });
    }

    let mut out = vec![0.0; n];
    let central = filter.apply(input);
    out[h..n - h].copy_from_slice(&central);
    for d in 0..h {
        let end = &right_ends[d];
        out[n - 1 - d] = end.apply_at(input, n - 1 - d);
        out[d] = end.mirror().apply_at(input, d);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn symmetric_filter_rejects_even_or_asymmetric_weights() {
        assert!(SymmetricFilter::new(vec![0.5, 0.5]).is_err());
        assert!(SymmetricFilter::new(vec![0.2, 0.5, 0.3]).is_err());
        assert!(SymmetricFilter::new(vec![0.25, 0.5, 0.25]).is_ok());
    }

    #[test]
    fn centered_moving_average_weights() {
        let ma = SymmetricFilter::centered_moving_average(12);
        assert_eq!(ma.length(), 13);
        assert_eq!(ma.drop(), 6);
        assert_relative_eq!(ma.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(ma.weight(6), 1.0 / 24.0, epsilon = 1e-15);
        assert_relative_eq!(ma.weight(0), 1.0 / 12.0, epsilon = 1e-15);

        let ma3 = SymmetricFilter::centered_moving_average(3);
        assert_eq!(ma3.length(), 3);
        assert_relative_eq!(ma3.weight(-1), 1.0 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn apply_trims_by_drop() {
        let ma = SymmetricFilter::centered_moving_average(4);
        let input: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let out = ma.apply(&input);
        assert_eq!(out.len(), input.len() - 2 * ma.drop());
        for (k, v) in out.iter().enumerate() {
            assert_relative_eq!(*v, (k + ma.drop()) as f64, epsilon = 1e-12);
        }

        let mut buf = vec![0.0; out.len()];
        ma.apply_into(&input, &mut buf).unwrap();
        assert_eq!(buf, out);
        let mut short = vec![0.0; 3];
        assert!(ma.apply_into(&input, &mut short).is_err());
    }

    #[test]
    fn cycle_average_annihilates_stable_seasonality() {
        let pattern = [3.0, -1.0, -4.0, 2.0];
        let input: Vec<f64> = (0..16).map(|i| pattern[i % 4]).collect();
        let out = SymmetricFilter::centered_moving_average(4).apply(&input);
        assert!(out.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn finite_filter_mirror() {
        let f = FiniteFilter::new(-2, vec![0.2, 0.3, 0.5]);
        let m = f.mirror();
        assert_eq!(m.lower_bound(), 0);
        assert_eq!(m.upper_bound(), 2);
        assert_eq!(m.weights(), &[0.5, 0.3, 0.2]);
        let input = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(f.apply_at(&input, 3), 0.2 * 2.0 + 0.3 * 3.0 + 0.5 * 4.0);
        assert_relative_eq!(m.apply_at(&input, 0), 0.5 * 1.0 + 0.3 * 2.0 + 0.2 * 3.0);
    }

    #[test]
    fn end_filters_cover_full_length() {
        let filter = SymmetricFilter::new(vec![0.25, 0.5, 0.25]).unwrap();
        let ends = vec![FiniteFilter::new(-1, vec![0.5, 0.5])];
        let input = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = apply_with_end_filters(&filter, &ends, &input).unwrap();
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out[0], 1.5);
        assert_relative_eq!(out[2], 3.0);
        assert_relative_eq!(out[4], 4.5);

        assert!(apply_with_end_filters(&filter, &ends, &input[..2]).is_err());
        assert!(apply_with_end_filters(&filter, &[], &input).is_err());
    }
}
