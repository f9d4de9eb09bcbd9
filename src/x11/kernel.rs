//! X-11 kernel: validation, the B/C/D passes and the result bundle.

use super::context::X11Context;
use super::mode::DecompositionMode;
use super::spec::X11Spec;
use super::step::{run_step, StepKind, StepPlan, StepTables};
use crate::core::Series;
use crate::error::{Result, ValidationError, X11Error};
use crate::filters::{apply_with_end_filters, henderson, musgrave_filters, SeasonalFilterKind};
use crate::utils::mean;
use tracing::debug;

/// Annual frequencies the X-11 filters are defined for.
pub const SUPPORTED_PERIODS: [usize; 5] = [2, 3, 4, 6, 12];

/// Musgrave ratio of the log-additive bias correction filter.
const BIAS_CORRECTION_ICR: f64 = 4.5;

/// Stateless X-11 decomposition engine.
///
/// # Example
///
/// ```
/// use anofox_x11::prelude::*;
///
/// let values: Vec<f64> = (0..48)
///     .map(|t| (100.0 + t as f64) * if t % 12 < 6 { 1.1 } else { 0.9 })
///     .collect();
/// let series = Series::monthly(values);
/// let kernel = X11Kernel::new(X11Spec::default());
/// let results = kernel.process(&series).unwrap();
/// assert_eq!(results.seasonal().len(), 48);
/// ```
#[derive(Debug, Clone, Default)]
pub struct X11Kernel {
    spec: X11Spec,
}

impl X11Kernel {
    pub fn new(spec: X11Spec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &X11Spec {
        &self.spec
    }

    /// Decompose `series` into trend-cycle, seasonal and irregular.
    pub fn process(&self, series: &Series) -> Result<X11Results> {
        self.validate(series)?;
        let ctx = X11Context::new(&self.spec, series.period())?;
        let mode = self.spec.mode;
        let ops = ctx.ops();

        let work = if mode == DecompositionMode::LogAdditive {
            series.map(f64::ln)
        } else {
            series.clone()
        };

        let b = run_step(
            &ctx,
            StepPlan {
                kind: StepKind::B,
                input: work.clone(),
                final_filters: ctx.final_filters(None),
            },
            &work,
        )?;
        let c1 = work.zip_with(&b.x20, |y, f| ops.remove(y, f))?;
        let c = run_step(
            &ctx,
            StepPlan {
                kind: StepKind::C,
                input: c1,
                final_filters: ctx.final_filters(Some(&b.msr)),
            },
            &work,
        )?;
        let d1 = work.zip_with(&c.x20, |y, f| ops.remove(y, f))?;
        let d = run_step(
            &ctx,
            StepPlan {
                kind: StepKind::D,
                input: d1,
                final_filters: ctx.final_filters(Some(&c.msr)),
            },
            &work,
        )?;

        let results = if mode == DecompositionMode::LogAdditive {
            let (b, c, d) = (b.map_values(f64::exp), c.map_values(f64::exp), d.map_values(f64::exp));
            let (trend, seasonal) = bias_correct(d.final_trend(), &d.x10)?;
            let seasonally_adjusted = series.zip_with(&seasonal, |y, s| y / s)?;
            let irregular = d.x13.clone();
            X11Results {
                mode,
                original: series.clone(),
                trend,
                seasonal,
                seasonally_adjusted,
                irregular,
                b,
                c,
                d,
            }
        } else {
            X11Results {
                mode,
                original: series.clone(),
                trend: d.final_trend().clone(),
                seasonal: d.x10.clone(),
                seasonally_adjusted: d.x11.clone(),
                irregular: d.x13.clone(),
                b,
                c,
                d,
            }
        };

        debug!(
            mode = %mode,
            henderson_length = results.henderson_length(),
            icr = results.icr(),
            global_msr = ?results.global_msr(),
            "X-11 decomposition completed"
        );
        Ok(results)
    }

    fn validate(&self, series: &Series) -> Result<()> {
        let period = series.period();
        if !SUPPORTED_PERIODS.contains(&period) {
            return Err(ValidationError::UnsupportedPeriod(period).into());
        }
        let needed = 3 * period;
        if series.len() < needed {
            return Err(ValidationError::TooShort {
                needed,
                got: series.len(),
            }
            .into());
        }
        if let Some(index) = series.values().iter().position(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite { index }.into());
        }
        if self.spec.mode.requires_positive() {
            if let Some(index) = series.values().iter().position(|&v| v <= 0.0) {
                return Err(ValidationError::NonPositive {
                    index,
                    value: series.values()[index],
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Length of the Henderson filter smoothing exponentiated seasonal factors.
fn bias_filter_length(period: usize) -> usize {
    if period == 2 {
        5
    } else {
        2 * period - 1
    }
}

/// Remove the level bias of exponentiated log-additive seasonal factors.
///
/// The yearly level of the factors is smoothed and moved from the seasonal
/// into the trend-cycle, so trend · seasonal is unchanged.
fn bias_correct(trend: &Series, seasonal: &Series) -> Result<(Series, Series)> {
    let length = bias_filter_length(seasonal.period());
    let smooth = if seasonal.len() >= length {
        let filter = henderson(length)?;
        let ends = musgrave_filters(&filter, BIAS_CORRECTION_ICR);
        apply_with_end_filters(&filter, &ends, seasonal.values())?
    } else {
        vec![mean(seasonal.values()); seasonal.len()]
    };
    if let Some(i) = smooth.iter().position(|v| v.abs() < 1e-12) {
        return Err(X11Error::NumericalDegeneracy(format!(
            "bias correction level vanishes at index {}",
            i
        )));
    }
    let smooth = seasonal.with_values(smooth);
    let seasonal = seasonal.zip_with(&smooth, |s, m| s / m)?;
    let trend = trend.zip_with(&smooth, |t, m| t * m)?;
    Ok((trend, seasonal))
}

/// Tables and final components of an X-11 decomposition.
#[derive(Debug, Clone)]
pub struct X11Results {
    mode: DecompositionMode,
    original: Series,
    trend: Series,
    seasonal: Series,
    seasonally_adjusted: Series,
    irregular: Series,
    b: StepTables,
    c: StepTables,
    d: StepTables,
}

/// Final components of a decomposition.
#[derive(Debug, Clone, Copy)]
pub struct FinalDecomposition<'a> {
    pub trend: &'a Series,
    pub seasonal: &'a Series,
    pub seasonally_adjusted: &'a Series,
    pub irregular: &'a Series,
}

impl X11Results {
    pub fn mode(&self) -> DecompositionMode {
        self.mode
    }

    /// Series that was decomposed.
    pub fn original(&self) -> &Series {
        &self.original
    }

    pub fn b(&self) -> &StepTables {
        &self.b
    }

    pub fn c(&self) -> &StepTables {
        &self.c
    }

    pub fn d(&self) -> &StepTables {
        &self.d
    }

    /// Tables of one step.
    pub fn step(&self, kind: StepKind) -> &StepTables {
        match kind {
            StepKind::B => &self.b,
            StepKind::C => &self.c,
            StepKind::D => &self.d,
        }
    }

    /// Table by name, e.g. `"d10"` or `"b20"`.
    pub fn table(&self, name: &str) -> Option<&Series> {
        let mut chars = name.chars();
        let kind = match chars.next()? {
            'b' | 'B' => StepKind::B,
            'c' | 'C' => StepKind::C,
            'd' | 'D' => StepKind::D,
            _ => return None,
        };
        let number: usize = chars.as_str().parse().ok()?;
        self.step(kind).table(number)
    }

    pub fn trend(&self) -> &Series {
        &self.trend
    }

    pub fn seasonal(&self) -> &Series {
        &self.seasonal
    }

    pub fn seasonally_adjusted(&self) -> &Series {
        &self.seasonally_adjusted
    }

    pub fn irregular(&self) -> &Series {
        &self.irregular
    }

    pub fn final_decomposition(&self) -> FinalDecomposition<'_> {
        FinalDecomposition {
            trend: &self.trend,
            seasonal: &self.seasonal,
            seasonally_adjusted: &self.seasonally_adjusted,
            irregular: &self.irregular,
        }
    }

    /// I/C ratio behind the final trend-cycle filter.
    pub fn icr(&self) -> f64 {
        self.d.final_trend_filter.map_or(self.d.icr, |(_, icr)| icr)
    }

    /// Henderson length of the final trend-cycle.
    pub fn henderson_length(&self) -> usize {
        self.d
            .final_trend_filter
            .map_or(self.d.henderson_length, |(length, _)| length)
    }

    /// Global moving seasonality ratio of the D step.
    pub fn global_msr(&self) -> Option<f64> {
        self.d.msr.global_msr()
    }

    /// Seasonal filters used for the final seasonal factors.
    pub fn final_seasonal_filters(&self) -> &[SeasonalFilterKind] {
        &self.d.final_filters
    }

    /// Recombine trend, seasonal and irregular.
    pub fn reconstruct(&self) -> Series {
        let values = (0..self.trend.len())
            .map(|i| {
                let (t, s, e) = (
                    self.trend.values()[i],
                    self.seasonal.values()[i],
                    self.irregular.values()[i],
                );
                match self.mode {
                    DecompositionMode::LogAdditive => t * s * e,
                    mode => mode.ops().combine(t, s, e),
                }
            })
            .collect();
        self.trend.with_values(values)
    }
}
