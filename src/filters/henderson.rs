//! Henderson trend-cycle filters.
//!
//! Henderson filters are the symmetric moving averages that minimise the sum
//! of squared third differences of their weights while reproducing cubic
//! polynomials. The weights are computed from the closed form given by
//! Kenny & Durbin (1982).

use super::linear::SymmetricFilter;
use crate::error::{Result, ValidationError};

/// Build the Henderson filter with `length` terms.
///
/// `length` must be odd and at least 5.
pub fn henderson(length: usize) -> Result<SymmetricFilter> {
    if length < 5 || length % 2 == 0 {
        return Err(ValidationError::InvalidParameter(format!(
            "Henderson filter length must be odd and >= 5, got {}",
            length
        ))
        .into());
    }
    SymmetricFilter::new(henderson_weights(length))
}

fn henderson_weights(length: usize) -> Vec<f64> {
    let m = (length / 2) as i64;
    let n = (m + 2) as f64;
    let n2 = n * n;
    let denom = 8.0 * n * (n2 - 1.0) * (4.0 * n2 - 1.0) * (4.0 * n2 - 9.0) * (4.0 * n2 - 25.0);

    (-m..=m)
        .map(|j| {
            let j2 = (j * j) as f64;
            315.0
                * ((n - 1.0).powi(2) - j2)
                * (n2 - j2)
                * ((n + 1.0).powi(2) - j2)
                * (3.0 * n2 - 16.0 - 11.0 * j2)
                / denom
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn henderson_rejects_invalid_lengths() {
        assert!(henderson(3).is_err());
        assert!(henderson(12).is_err());
        assert!(henderson(13).is_ok());
    }

    #[test]
    fn henderson_published_weights() {
        let h13 = henderson(13).unwrap();
        assert_relative_eq!(h13.weight(0), 0.24006, epsilon = 1e-5);
        assert_relative_eq!(h13.weight(1), 0.21434, epsilon = 1e-5);
        assert_relative_eq!(h13.weight(6), -0.01935, epsilon = 1e-5);

        let h5 = henderson(5).unwrap();
        assert_relative_eq!(h5.weight(0), 0.55944, epsilon = 1e-5);
        assert_relative_eq!(h5.weight(2), -0.07343, epsilon = 1e-5);

        let h23 = henderson(23).unwrap();
        assert_relative_eq!(h23.weight(0), 0.14406, epsilon = 1e-5);
    }

    #[test]
    fn henderson_reproduces_cubics() {
        for len in [5, 7, 9, 13, 23] {
            let h = henderson(len).unwrap();
            assert_relative_eq!(h.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            let input: Vec<f64> = (0..40)
                .map(|t| {
                    let t = t as f64;
                    2.0 - 0.5 * t + 0.03 * t * t - 0.001 * t * t * t
                })
                .collect();
            let out = h.apply(&input);
            for (k, v) in out.iter().enumerate() {
                assert_relative_eq!(*v, input[k + h.drop()], epsilon = 1e-9);
            }
        }
    }
}
