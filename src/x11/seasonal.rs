//! Seasonal filtering of seasonal-irregular ratios.
//!
//! Every within-cycle position is smoothed on its own: the subsequence of
//! Januaries is filtered independently of the Februaries, and so on.

use crate::core::Series;
use crate::error::{Result, X11Error};
use crate::filters::{apply_with_end_filters, SeasonalFilterKind};
use crate::utils::mean;
use tracing::debug;

/// Longest filter among `requested` and its shorter fallbacks that fits
/// `available` values.
pub fn fitting_filter(requested: SeasonalFilterKind, available: usize) -> SeasonalFilterKind {
    let mut kind = requested;
    while kind.span() > available {
        match kind.shorter() {
            Some(next) => kind = next,
            None => break,
        }
    }
    kind
}

/// Smooth each position of `series` with its seasonal filter.
///
/// `filters` holds one filter per within-cycle position. The output has the
/// same length and alignment as the input.
pub fn process(series: &Series, filters: &[SeasonalFilterKind]) -> Result<Series> {
    let period = series.period();
    if filters.len() != period {
        return Err(X11Error::DimensionMismatch {
            expected: period,
            got: filters.len(),
        });
    }

    let mut out = vec![0.0; series.len()];
    for (position, &requested) in filters.iter().enumerate() {
        let indices: Vec<usize> = series.indices_at(position).collect();
        if indices.is_empty() {
            continue;
        }
        let sub: Vec<f64> = indices.iter().map(|&i| series.values()[i]).collect();

        let kind = fitting_filter(requested, sub.len());
        if kind != requested {
            debug!(
                position,
                requested = %requested,
                used = %kind,
                years = sub.len(),
                "seasonal filter shortened"
            );
        }

        let smoothed = match kind.moving_average() {
            Some(ma) => apply_with_end_filters(ma.central(), ma.right_ends(), &sub)?,
            None => vec![mean(&sub); sub.len()],
        };
        for (&i, v) in indices.iter().zip(smoothed) {
            out[i] = v;
        }
    }
    Ok(series.with_values(out))
}
