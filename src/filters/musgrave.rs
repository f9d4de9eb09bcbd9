//! Musgrave asymmetric end filters.
//!
//! Near the end of a series a symmetric trend filter lacks future
//! observations. Musgrave's filters replace it, for each number of available
//! future values, by the asymmetric filter minimising the expected revision
//! under a local linear trend whose slope-to-noise ratio is derived from the
//! I/C ratio `R` (D = 4 / (π R²)).

use super::linear::{FiniteFilter, SymmetricFilter};
use std::f64::consts::PI;

/// Right-end filters for `filter`, indexed by the number of future
/// observations available (0 ..= drop - 1).
///
/// `icr` is the irregular/cyclical ratio. As it goes to zero the filters
/// reproduce straight lines exactly.
pub fn musgrave_filters(filter: &SymmetricFilter, icr: f64) -> Vec<FiniteFilter> {
    let h = filter.drop();
    (0..h)
        .map(|future| musgrave_filter(filter, future, icr))
        .collect()
}

/// End filter using `future` observations after the target.
pub fn musgrave_filter(filter: &SymmetricFilter, future: usize, icr: f64) -> FiniteFilter {
    let w = filter.weights();
    let h = filter.drop();
    let m = h + future + 1;

    // Positions are 1-based as in the published formula.
    let c = (m as f64 + 1.0) / 2.0;
    let k = (m as f64) * (m as f64 - 1.0) * (m as f64 + 1.0) / 12.0;
    let missing: f64 = w[m..].iter().sum();
    let moment: f64 = w[m..]
        .iter()
        .enumerate()
        .map(|(j, wj)| ((m + j + 1) as f64 - c) * wj)
        .sum();
    let noise = PI * icr * icr / 4.0;
    let slope_term = if k + noise > 0.0 { moment / (k + noise) } else { 0.0 };

    let weights = (0..m)
        .map(|i| w[i] + missing / m as f64 + ((i + 1) as f64 - c) * slope_term)
        .collect();
    FiniteFilter::new(-(h as isize), weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::henderson::henderson;
    use approx::assert_relative_eq;

    #[test]
    fn musgrave_matches_published_13_term_end_weights() {
        let h13 = henderson(13).unwrap();
        let ends = musgrave_filters(&h13, 3.5);
        assert_eq!(ends.len(), 6);

        let last = ends[0].weights();
        let expected = [-0.09186, -0.05811, 0.01202, 0.11977, 0.24390, 0.35315, 0.42113];
        assert_eq!(last.len(), expected.len());
        for (a, b) in last.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
        assert_eq!(ends[0].lower_bound(), -6);
        assert_eq!(ends[0].upper_bound(), 0);
        assert_eq!(ends[5].upper_bound(), 5);
    }

    #[test]
    fn musgrave_filters_preserve_level() {
        let h9 = henderson(9).unwrap();
        for f in musgrave_filters(&h9, 1.0) {
            assert_relative_eq!(f.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_icr_reproduces_lines() {
        let h23 = henderson(23).unwrap();
        let input: Vec<f64> = (0..30).map(|t| 4.0 + 0.7 * t as f64).collect();
        for (future, f) in musgrave_filters(&h23, 0.0).iter().enumerate() {
            let idx = input.len() - 1 - future;
            assert_relative_eq!(f.apply_at(&input, idx), input[idx], epsilon = 1e-10);
        }
    }
}
