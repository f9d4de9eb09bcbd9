//! Normalization of raw seasonal factors.
//!
//! Raw factors coming out of the seasonal filters do not sum (or average) to
//! the neutral element over a year. They are centred with a 2×P moving
//! average, and the series can be extended at both ends to cover the
//! observations a previous trimming step removed.

use super::mode::ModeOps;
use crate::core::Series;
use crate::error::{Result, X11Error};
use crate::filters::SymmetricFilter;
use crate::utils::mean;

/// Cycle-average of `raw` at each observation.
///
/// Positions the centred moving average cannot reach copy the value one
/// period inward. Series shorter than the filter use the overall mean.
fn cycle_levels(raw: &Series) -> Vec<f64> {
    let n = raw.len();
    let period = raw.period();
    let ma = SymmetricFilter::centered_moving_average(period);
    let h = ma.drop();
    if n < ma.length() {
        return vec![mean(raw.values()); n];
    }

    let mut levels = vec![0.0; n];
    levels[h..n - h].copy_from_slice(&ma.apply(raw.values()));
    for i in (0..h).rev() {
        levels[i] = if i + period < n - h {
            levels[i + period]
        } else {
            levels[h]
        };
    }
    for i in n - h..n {
        levels[i] = if i >= period + h {
            levels[i - period]
        } else {
            levels[n - h - 1]
        };
    }
    levels
}

/// Centre `raw` on the neutral element and extend it by `drop` values at
/// each end.
///
/// The extension repeats the factor of the same position one period inward.
/// The result starts `drop` observations before `raw`.
pub fn normalize(raw: &Series, drop: usize, ops: &ModeOps) -> Result<Series> {
    let n = raw.len();
    let period = raw.period();
    if drop > 0 && n < period {
        return Err(X11Error::DimensionMismatch {
            expected: period,
            got: n,
        });
    }

    let levels = cycle_levels(raw);
    if let Some(i) = levels.iter().position(|&l| ops.is_degenerate_level(l)) {
        return Err(X11Error::NumericalDegeneracy(format!(
            "seasonal level {} at index {} cannot be used as a divisor",
            levels[i], i
        )));
    }

    let mut out = vec![0.0; n + 2 * drop];
    for (slot, (&s, &l)) in out[drop..drop + n]
        .iter_mut()
        .zip(raw.values().iter().zip(levels.iter()))
    {
        *slot = ops.normalize_by(s, l);
    }
    for k in (0..drop).rev() {
        out[k] = out[k + period];
    }
    for k in drop + n..n + 2 * drop {
        out[k] = out[k - period];
    }
    Ok(raw.extended_back(drop, out))
}
