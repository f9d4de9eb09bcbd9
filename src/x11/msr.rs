//! Moving seasonality ratio (MSR) and the final seasonal filter choice.
//!
//! The MSR compares the year-to-year movement of the irregular with that of
//! the seasonal component at each within-cycle position. A noisy irregular
//! relative to a slowly moving seasonal calls for a longer seasonal filter.

use super::mode::ModeOps;
use super::seasonal;
use crate::core::Series;
use crate::error::Result;
use crate::filters::SeasonalFilterKind;
use crate::utils::mean_abs_change;
use tracing::{debug, warn};

/// Maximum number of trailing years dropped while the MSR is ambiguous.
pub const MAX_DROPPED_YEARS: usize = 5;

/// Years that must remain after dropping a trailing year.
pub const MIN_MSR_YEARS: usize = 4;

/// Filter used when the MSR never leaves an ambiguous zone.
pub const FALLBACK_FILTER: SeasonalFilterKind = SeasonalFilterKind::S3x5;

/// Year-to-year evolution of the irregular and seasonal at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MsrEntry {
    /// Mean absolute year-to-year change of the irregular.
    pub irregular_evolution: f64,
    /// Mean absolute year-to-year change of the seasonal.
    pub seasonal_evolution: f64,
    /// Number of year-to-year changes averaged.
    pub count: usize,
}

impl MsrEntry {
    /// Moving seasonality ratio, `None` when the seasonal does not move.
    pub fn ratio(&self) -> Option<f64> {
        if self.seasonal_evolution > f64::EPSILON * self.irregular_evolution.max(1.0) {
            Some(self.irregular_evolution / self.seasonal_evolution)
        } else {
            None
        }
    }
}

/// MSR entries for every within-cycle position.
#[derive(Debug, Clone, PartialEq)]
pub struct MsrTable {
    entries: Vec<MsrEntry>,
}

impl MsrTable {
    /// Compute the table from SI ratios and their seasonal estimate.
    pub fn compute(si: &Series, seasonal: &Series, ops: &ModeOps) -> Result<Self> {
        let irregular = si.zip_with(seasonal, |x, s| ops.irregular_of(x, s))?;
        let relative = ops.is_multiplicative();

        let entries = (0..si.period())
            .map(|position| {
                let idx: Vec<usize> = si.indices_at(position).collect();
                let i: Vec<f64> = idx.iter().map(|&k| irregular.values()[k]).collect();
                let s: Vec<f64> = idx.iter().map(|&k| seasonal.values()[k]).collect();
                MsrEntry {
                    irregular_evolution: mean_abs_change(&i, 1, relative),
                    seasonal_evolution: mean_abs_change(&s, 1, relative),
                    count: idx.len().saturating_sub(1),
                }
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MsrEntry] {
        &self.entries
    }

    pub fn entry(&self, position: usize) -> Option<&MsrEntry> {
        self.entries.get(position)
    }

    /// Ratio of the count-weighted evolutions over all positions.
    pub fn global_ratio(&self) -> Option<f64> {
        let (irr, sea, count) = self.entries.iter().fold((0.0, 0.0, 0), |acc, e| {
            (
                acc.0 + e.irregular_evolution * e.count as f64,
                acc.1 + e.seasonal_evolution * e.count as f64,
                acc.2 + e.count,
            )
        });
        if count == 0 {
            return None;
        }
        MsrEntry {
            irregular_evolution: irr / count as f64,
            seasonal_evolution: sea / count as f64,
            count,
        }
        .ratio()
    }
}

/// Seasonal filter for an MSR value, `None` inside the ambiguous zones.
pub fn select_filter(msr: f64) -> Option<SeasonalFilterKind> {
    if msr < 2.5 {
        Some(SeasonalFilterKind::S3x3)
    } else if msr < 3.5 {
        None
    } else if msr < 5.5 {
        Some(SeasonalFilterKind::S3x5)
    } else if msr <= 6.5 {
        None
    } else {
        Some(SeasonalFilterKind::S3x9)
    }
}

/// Outcome of the MSR based seasonal filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MsrDecision {
    filters: Vec<SeasonalFilterKind>,
    global_msr: Option<f64>,
    table: MsrTable,
    years_dropped: usize,
}

impl MsrDecision {
    /// Selected filter per within-cycle position.
    pub fn filters(&self) -> &[SeasonalFilterKind] {
        &self.filters
    }

    /// Global MSR of the table the decision was taken on.
    pub fn global_msr(&self) -> Option<f64> {
        self.global_msr
    }

    pub fn table(&self) -> &MsrTable {
        &self.table
    }

    /// Number of trailing years dropped to leave the ambiguous zone.
    pub fn years_dropped(&self) -> usize {
        self.years_dropped
    }
}

/// Choose the final seasonal filter from robustified SI ratios.
///
/// The MSR is measured against a 3×3 seasonal estimate of `si`. While the
/// ratio is ambiguous the last year is dropped and the ratio recomputed;
/// an undecided choice falls back to 3×5.
pub fn select_seasonal_filter(
    si: &Series,
    ops: &ModeOps,
    per_position: bool,
) -> Result<MsrDecision> {
    let period = si.period();
    let mut decided: Vec<Option<SeasonalFilterKind>> = vec![None; period];
    let mut dropped = 0;

    loop {
        let sample = si.drop(0, dropped * period);
        let seasonal = seasonal::process(&sample, &vec![SeasonalFilterKind::S3x3; period])?;
        let table = MsrTable::compute(&sample, &seasonal, ops)?;
        let global_msr = table.global_ratio();

        let undefined = if per_position {
            for (slot, entry) in decided.iter_mut().zip(table.entries()) {
                if slot.is_none() {
                    *slot = entry.ratio().and_then(select_filter);
                }
            }
            table.entries().iter().all(|e| e.ratio().is_none())
        } else {
            let choice = global_msr.and_then(select_filter);
            decided.iter_mut().for_each(|slot| *slot = choice);
            global_msr.is_none()
        };

        let settled = decided.iter().all(Option::is_some);
        let can_drop = can_drop_year(sample.len(), period, dropped);
        if settled || undefined || !can_drop {
            if !settled {
                warn!(
                    global_msr = ?global_msr,
                    years_dropped = dropped,
                    "MSR undecided, falling back to 3x5 seasonal filter"
                );
            }
            let filters: Vec<SeasonalFilterKind> = decided
                .iter()
                .map(|d| d.unwrap_or(FALLBACK_FILTER))
                .collect();
            debug!(global_msr = ?global_msr, years_dropped = dropped, filter = %filters[0], "MSR filter selected");
            return Ok(MsrDecision {
                filters,
                global_msr,
                table,
                years_dropped: dropped,
            });
        }
        dropped += 1;
    }
}

/// Whether one more trailing year may be dropped from a sample of `len`.
fn can_drop_year(len: usize, period: usize, dropped: usize) -> bool {
    dropped < MAX_DROPPED_YEARS && len >= (MIN_MSR_YEARS + 1) * period
}
