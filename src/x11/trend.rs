//! Trend-cycle estimation: I/C ratio, Henderson length selection and
//! Musgrave end-point treatment.

use super::context::X11Context;
use crate::core::Series;
use crate::error::{Result, X11Error};
use crate::filters::{apply_with_end_filters, henderson, musgrave_filters};
use crate::utils::mean_abs_change;
use tracing::{debug, warn};

/// Upper bound reported for the I/C ratio when the cyclical part is flat.
pub const MAX_ICR: f64 = 1.0e6;

/// Trend-cycle estimate together with the filter that produced it.
#[derive(Debug, Clone)]
pub struct TrendEstimate {
    /// Trend-cycle values, same length as the input.
    pub values: Series,
    /// Henderson filter length used.
    pub length: usize,
    /// I/C ratio used for the Musgrave end filters.
    pub icr: f64,
}

/// Length of the preliminary Henderson filter used to measure the I/C ratio.
fn preliminary_length(period: usize) -> usize {
    if period <= 4 {
        5
    } else {
        (period + 1) | 1
    }
}

/// Ratio of the mean absolute change of the irregular to that of the
/// trend-cycle in a seasonally adjusted series.
///
/// Only the interior covered by the symmetric preliminary filter is used.
pub fn calc_icr(ctx: &X11Context, sa: &Series) -> Result<f64> {
    let length = preliminary_length(ctx.period());
    let filter = henderson(length)?;
    let h = filter.drop();
    if sa.len() < length + 2 {
        return Ok(default_icr(length));
    }

    let ops = ctx.ops();
    let relative = ops.is_multiplicative();
    let trend = filter.apply(sa.values());
    let irregular: Vec<f64> = sa.values()[h..sa.len() - h]
        .iter()
        .zip(trend.iter())
        .map(|(&y, &t)| ops.remove(y, t))
        .collect();

    let gi = mean_abs_change(&irregular, 1, relative);
    let gc = mean_abs_change(&trend, 1, relative);
    let icr = if gc <= f64::EPSILON * gi.abs().max(1.0) {
        if gi <= f64::EPSILON {
            0.0
        } else {
            MAX_ICR
        }
    } else {
        (gi / gc).min(MAX_ICR)
    };
    Ok(icr)
}

/// Henderson length selected for an I/C ratio.
pub fn select_length(icr: f64, period: usize) -> usize {
    if period >= 12 {
        if icr < 1.0 {
            9
        } else if icr < 3.5 {
            13
        } else {
            23
        }
    } else {
        let short = if period <= 4 { 5 } else { (period + 1) | 1 };
        if icr < 1.0 {
            short
        } else {
            short + 2
        }
    }
}

/// Musgrave ratio associated with a fixed Henderson length.
pub fn default_icr(length: usize) -> f64 {
    match length {
        0..=5 => 0.001,
        7 => 4.5,
        8 | 9 => 1.0,
        10..=13 => 3.5,
        _ => 4.5,
    }
}

/// Replace non-positive trend values by the smallest positive one.
///
/// Returns the number of values replaced.
pub fn make_positive(values: &mut [f64]) -> Result<usize> {
    let floor = values
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !floor.is_finite() {
        return Err(X11Error::NumericalDegeneracy(
            "trend-cycle has no positive value".to_string(),
        ));
    }
    let mut replaced = 0;
    for v in values.iter_mut() {
        if *v <= 0.0 {
            *v = floor;
            replaced += 1;
        }
    }
    Ok(replaced)
}

/// Henderson trend-cycle of a seasonally adjusted series.
///
/// The length is either fixed by the context or chosen from the I/C ratio.
pub fn estimate_trend(ctx: &X11Context, sa: &Series) -> Result<TrendEstimate> {
    let (requested, icr) = match ctx.henderson_length() {
        Some(length) => (length, default_icr(length)),
        None => {
            let icr = calc_icr(ctx, sa)?;
            (select_length(icr, ctx.period()), icr)
        }
    };

    let mut length = requested;
    while length > 5 && length > sa.len() {
        length -= 2;
    }
    if length != requested {
        debug!(requested, length, n = sa.len(), "Henderson filter shortened to fit series");
    }

    let filter = henderson(length)?;
    let ends = musgrave_filters(&filter, icr);
    let mut values = apply_with_end_filters(&filter, &ends, sa.values())?;

    if ctx.ops().is_multiplicative() {
        let replaced = make_positive(&mut values)?;
        if replaced > 0 {
            warn!(replaced, "non-positive trend-cycle values floored");
        }
    }

    debug!(length, icr, "trend-cycle estimated");
    Ok(TrendEstimate {
        values: sa.with_values(values),
        length,
        icr,
    })
}
