//! One B, C or D pass of the X-11 pipeline.
//!
//! The three steps share the same filtering sequence; they differ in their
//! input (original series or extreme-corrected series), in the final seasonal
//! filters, and in the D step's re-estimation of the trend from the final
//! seasonally adjusted series.

use super::context::X11Context;
use super::msr::{select_seasonal_filter, MsrDecision};
use super::normalizer::normalize;
use super::seasonal;
use super::trend::{estimate_trend, TrendEstimate};
use crate::core::Series;
use crate::error::{Result, X11Error};
use crate::filters::{SeasonalFilterKind, SymmetricFilter};
use tracing::debug;

/// Pass of the X-11 pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    B,
    C,
    D,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::B => "b",
            StepKind::C => "c",
            StepKind::D => "d",
        };
        write!(f, "{}", name)
    }
}

/// What a step filters and with which final seasonal filters.
#[derive(Debug, Clone)]
pub struct StepPlan {
    pub kind: StepKind,
    /// Step input (table 1).
    pub input: Series,
    /// Final-pass seasonal filter per within-cycle position.
    pub final_filters: Vec<SeasonalFilterKind>,
}

/// Tables produced by one step.
///
/// Tables 2 and 3 are shorter than the input by half a cycle at each end;
/// all other tables cover the full input span, end-point filters filling
/// the observations the symmetric filters trim (see [`symmetric_span`]).
///
/// [`symmetric_span`]: StepTables::symmetric_span
#[derive(Debug, Clone)]
pub struct StepTables {
    pub kind: StepKind,
    /// Step input.
    pub x1: Series,
    /// Centred 2×P moving average (trimmed).
    pub x2: Series,
    /// Seasonal-irregular ratios (trimmed).
    pub x3: Series,
    /// Replacement values for the SI ratios of table 3.
    pub x4: Series,
    /// Extreme-value weights of the first robustification.
    pub x4_weights: Series,
    /// Preliminary seasonal factors.
    pub x5: Series,
    /// Preliminary seasonally adjusted series.
    pub x6: Series,
    /// Trend-cycle (Henderson).
    pub x7: Series,
    /// Seasonal-irregular ratios against the trend-cycle.
    pub x8: Series,
    /// Replacement values for the SI ratios of table 8.
    pub x9: Series,
    /// Extreme-value weights of the second robustification.
    pub x9_weights: Series,
    /// Final seasonal factors.
    pub x10: Series,
    /// Seasonally adjusted series.
    pub x11: Series,
    /// Final trend-cycle (D step only).
    pub x12: Option<Series>,
    /// Irregular.
    pub x13: Series,
    /// Extreme-value weights of the irregular.
    pub x17: Series,
    /// Extreme-value correction factors.
    pub x20: Series,
    /// Henderson length of table 7.
    pub henderson_length: usize,
    /// I/C ratio of table 7.
    pub icr: f64,
    /// Henderson length and I/C ratio of table 12.
    pub final_trend_filter: Option<(usize, f64)>,
    /// Observations trimmed at each end by the step's symmetric filters.
    pub symmetric_trim: usize,
    /// Seasonal filters used for table 10.
    pub final_filters: Vec<SeasonalFilterKind>,
    /// MSR based filter choice for the next step.
    pub msr: MsrDecision,
}

impl StepTables {
    /// Table by number, e.g. `table(10)` for the final seasonal factors.
    pub fn table(&self, number: usize) -> Option<&Series> {
        match number {
            1 => Some(&self.x1),
            2 => Some(&self.x2),
            3 => Some(&self.x3),
            4 => Some(&self.x4),
            5 => Some(&self.x5),
            6 => Some(&self.x6),
            7 => Some(&self.x7),
            8 => Some(&self.x8),
            9 => Some(&self.x9),
            10 => Some(&self.x10),
            11 => Some(&self.x11),
            12 => self.x12.as_ref(),
            13 => Some(&self.x13),
            17 => Some(&self.x17),
            20 => Some(&self.x20),
            _ => None,
        }
    }

    /// Trend-cycle that the step's adjusted series and irregular refer to.
    pub fn final_trend(&self) -> &Series {
        self.x12.as_ref().unwrap_or(&self.x7)
    }

    /// Indices reached by the step's symmetric filters alone.
    ///
    /// The B step trims by the half-lengths of its preliminary trend and
    /// initial seasonal filter; C and D trim by the trend filter only.
    pub fn symmetric_span(&self) -> std::ops::Range<usize> {
        let n = self.x1.len();
        let trim = self.symmetric_trim.min(n / 2);
        trim..n - trim
    }

    /// Apply `f` to every value table, leaving the weight tables untouched.
    pub(crate) fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Copy,
    {
        Self {
            kind: self.kind,
            x1: self.x1.map(f),
            x2: self.x2.map(f),
            x3: self.x3.map(f),
            x4: self.x4.map(f),
            x4_weights: self.x4_weights.clone(),
            x5: self.x5.map(f),
            x6: self.x6.map(f),
            x7: self.x7.map(f),
            x8: self.x8.map(f),
            x9: self.x9.map(f),
            x9_weights: self.x9_weights.clone(),
            x10: self.x10.map(f),
            x11: self.x11.map(f),
            x12: self.x12.as_ref().map(|s| s.map(f)),
            x13: self.x13.map(f),
            x17: self.x17.clone(),
            x20: self.x20.map(f),
            henderson_length: self.henderson_length,
            icr: self.icr,
            final_trend_filter: self.final_trend_filter,
            symmetric_trim: self.symmetric_trim,
            final_filters: self.final_filters.clone(),
            msr: self.msr.clone(),
        }
    }
}

/// Robustified SI ratios and the tables describing the robustification.
struct Robustified {
    si: Series,
    replacements: Series,
    weights: Series,
}

/// Seasonal estimate of `si`, down-weight its extremes and return the
/// robustified ratios.
fn robustify(ctx: &X11Context, si: &Series, filters: &[SeasonalFilterKind]) -> Result<Robustified> {
    let ops = ctx.ops();
    let seasonal = normalize(&seasonal::process(si, filters)?, 0, &ops)?;
    let irregular = si.zip_with(&seasonal, |x, s| ops.irregular_of(x, s))?;
    let analysis = ctx.extreme_corrector().analyse(&irregular);
    let corrections = analysis.compute_corrections(si)?;
    let robust = analysis.apply_corrections(si, &corrections)?;
    Ok(Robustified {
        si: robust,
        replacements: corrections.values().clone(),
        weights: analysis.weights_series(),
    })
}

/// Run one step.
///
/// `original` is the series being decomposed (table b1); the adjusted series
/// and irregular always refer to it, whatever the step input.
pub fn run_step(ctx: &X11Context, plan: StepPlan, original: &Series) -> Result<StepTables> {
    let ops = ctx.ops();
    let x1 = plan.input;
    let initial = ctx.initial_filters();

    // Preliminary trend and SI ratios.
    let ma = SymmetricFilter::centered_moving_average(ctx.period());
    let h = ma.drop();
    let x1_inner = x1.drop(h, h);
    let x2 = x1_inner.with_values(ma.apply(x1.values()));
    let x3 = x1_inner.zip_with(&x2, |y, t| ops.remove(y, t))?;

    // Preliminary seasonal factors.
    let first = robustify(ctx, &x3, &initial)?;
    let x5 = normalize(&seasonal::process(&first.si, &initial)?, h, &ops)?;
    let x6 = x1.zip_with(&x5, |y, s| ops.adjust(y, s, None))?;

    // Trend-cycle and final seasonal factors.
    let TrendEstimate {
        values: x7,
        length: henderson_length,
        icr,
    } = estimate_trend(ctx, &x6)?;
    let x8 = x1.zip_with(&x7, |y, t| ops.remove(y, t))?;
    let second = robustify(ctx, &x8, &plan.final_filters)?;
    let x10 = normalize(&seasonal::process(&second.si, &plan.final_filters)?, 0, &ops)?;

    let (x12, final_trend_filter) = if plan.kind == StepKind::D {
        let sa = adjust_with_trend(ctx, &x1, &x10, &x7)?;
        let est = estimate_trend(ctx, &sa)?;
        (Some(est.values), Some((est.length, est.icr)))
    } else {
        (None, None)
    };
    let trend = x12.as_ref().unwrap_or(&x7);

    let symmetric_trim = match plan.kind {
        StepKind::B => h + initial.first().map_or(0, |k| k.span() / 2) * ctx.period(),
        StepKind::C | StepKind::D => {
            final_trend_filter.map_or(henderson_length, |(length, _)| length) / 2
        }
    };

    let x11 = adjust_with_trend(ctx, original, &x10, trend)?;
    let si = original.zip_with(trend, |y, t| ops.remove(y, t))?;
    let x13 = si.zip_with(&x10, |x, s| ops.irregular_of(x, s))?;

    let terminal = ctx.extreme_corrector().analyse(&x13);
    let x17 = terminal.weights_series();
    let x20 = terminal.correction_factors(original, &ops)?;

    let msr = select_seasonal_filter(&second.si, &ops, ctx.msr_per_position())?;

    debug!(
        step = %plan.kind,
        henderson_length,
        icr,
        extremes = terminal.extreme_count(),
        next_filter = %msr.filters()[0],
        "step completed"
    );

    Ok(StepTables {
        kind: plan.kind,
        x1,
        x2,
        x3,
        x4: first.replacements,
        x4_weights: first.weights,
        x5,
        x6,
        x7,
        x8,
        x9: second.replacements,
        x9_weights: second.weights,
        x10,
        x11,
        x12,
        x13,
        x17,
        x20,
        henderson_length,
        icr,
        final_trend_filter,
        symmetric_trim,
        final_filters: plan.final_filters,
        msr,
    })
}

fn adjust_with_trend(ctx: &X11Context, y: &Series, seasonal: &Series, trend: &Series) -> Result<Series> {
    for other in [seasonal, trend] {
        if other.len() != y.len() {
            return Err(X11Error::DimensionMismatch {
                expected: y.len(),
                got: other.len(),
            });
        }
    }
    let ops = ctx.ops();
    let values = y
        .values()
        .iter()
        .zip(seasonal.values())
        .zip(trend.values())
        .map(|((&y, &s), &t)| ops.adjust(y, s, Some(t)))
        .collect();
    Ok(y.with_values(values))
}
