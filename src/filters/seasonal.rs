//! X-11 seasonal moving averages.
//!
//! The 3×k filters are applied to the subsequence of one within-cycle
//! position (all Januaries, all second quarters, ...). Their end weights are
//! the published X-11 tables for 3×3 and 3×5; the 3×9 end weights follow the
//! same construction: the truncated mass is spread evenly over the last
//! (k + 3) / 2 available values, and the last-point filter puts
//! (2k − 1) / (3k(k + 3) / 2) on its oldest value and equal weights elsewhere.

use super::linear::{FiniteFilter, SymmetricFilter};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seasonal moving average applied to each within-cycle subsequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeasonalFilterKind {
    /// Mean of all values at the position.
    Stable,
    /// 3×3 moving average.
    S3x3,
    /// 3×5 moving average.
    S3x5,
    /// 3×9 moving average.
    S3x9,
}

const S3X3: [f64; 5] = [1.0, 2.0, 3.0, 2.0, 1.0];
const S3X3_ENDS: [(f64, &[f64]); 2] = [(27.0, &[5.0, 11.0, 11.0]), (27.0, &[3.0, 7.0, 10.0, 7.0])];

const S3X5: [f64; 7] = [1.0, 2.0, 3.0, 3.0, 3.0, 2.0, 1.0];
const S3X5_ENDS: [(f64, &[f64]); 3] = [
    (60.0, &[9.0, 17.0, 17.0, 17.0]),
    (60.0, &[4.0, 11.0, 15.0, 15.0, 15.0]),
    (60.0, &[4.0, 8.0, 13.0, 13.0, 13.0, 9.0]),
];

const S3X9: [f64; 11] = [1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.0];
const S3X9_ENDS: [(f64, &[f64]); 5] = [
    (162.0, &[17.0, 29.0, 29.0, 29.0, 29.0, 29.0]),
    (54.0, &[2.0, 7.0, 9.0, 9.0, 9.0, 9.0, 9.0]),
    (27.0, &[1.0, 2.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0]),
    (54.0, &[2.0, 4.0, 6.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0]),
    (162.0, &[6.0, 12.0, 18.0, 18.0, 19.0, 19.0, 19.0, 19.0, 19.0, 13.0]),
];

impl SeasonalFilterKind {
    /// Number of values needed to apply the full symmetric filter.
    pub fn span(self) -> usize {
        match self {
            SeasonalFilterKind::Stable => 1,
            SeasonalFilterKind::S3x3 => S3X3.len(),
            SeasonalFilterKind::S3x5 => S3X5.len(),
            SeasonalFilterKind::S3x9 => S3X9.len(),
        }
    }

    /// Next shorter filter, if any.
    pub fn shorter(self) -> Option<SeasonalFilterKind> {
        match self {
            SeasonalFilterKind::S3x9 => Some(SeasonalFilterKind::S3x5),
            SeasonalFilterKind::S3x5 => Some(SeasonalFilterKind::S3x3),
            SeasonalFilterKind::S3x3 => Some(SeasonalFilterKind::Stable),
            SeasonalFilterKind::Stable => None,
        }
    }

    /// Central filter and right-end filters, or `None` for the stable mean.
    pub fn moving_average(self) -> Option<SeasonalMovingAverage> {
        let (central, ends): (&[f64], &[(f64, &[f64])]) = match self {
            SeasonalFilterKind::Stable => return None,
            SeasonalFilterKind::S3x3 => (&S3X3[..], &S3X3_ENDS[..]),
            SeasonalFilterKind::S3x5 => (&S3X5[..], &S3X5_ENDS[..]),
            SeasonalFilterKind::S3x9 => (&S3X9[..], &S3X9_ENDS[..]),
        };
        let total: f64 = central.iter().sum();
        let h = central.len() / 2;
        Some(SeasonalMovingAverage {
            central: SymmetricFilter::from_table(central.iter().map(|w| w / total).collect()),
            right_ends: ends
                .iter()
                .map(|(denom, w)| {
                    FiniteFilter::new(-(h as isize), w.iter().map(|x| x / denom).collect())
                })
                .collect(),
        })
    }
}

impl std::fmt::Display for SeasonalFilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeasonalFilterKind::Stable => "stable",
            SeasonalFilterKind::S3x3 => "3x3",
            SeasonalFilterKind::S3x5 => "3x5",
            SeasonalFilterKind::S3x9 => "3x9",
        };
        write!(f, "{}", name)
    }
}

/// Weights of a 3×k seasonal filter.
#[derive(Debug, Clone)]
pub struct SeasonalMovingAverage {
    central: SymmetricFilter,
    right_ends: Vec<FiniteFilter>,
}

impl SeasonalMovingAverage {
    pub fn central(&self) -> &SymmetricFilter {
        &self.central
    }

    pub fn right_ends(&self) -> &[FiniteFilter] {
        &self.right_ends
    }
}
