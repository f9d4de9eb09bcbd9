//! Per-run decomposition context derived from the configuration.

use super::extreme::ExtremeValuesCorrector;
use super::mode::{DecompositionMode, ModeOps};
use super::msr::MsrDecision;
use super::spec::{SeasonalFilterOption, SigmaScope, X11Spec};
use crate::error::Result;
use crate::filters::SeasonalFilterKind;

/// Seasonal filter used by the final pass when the MSR has not been computed yet.
pub const DEFAULT_FINAL_FILTER: SeasonalFilterKind = SeasonalFilterKind::S3x5;

/// Everything the steps need to know about one decomposition run.
#[derive(Debug, Clone)]
pub struct X11Context {
    period: usize,
    mode: DecompositionMode,
    ops: ModeOps,
    initial_filter: SeasonalFilterKind,
    final_filters: Vec<SeasonalFilterOption>,
    msr_per_position: bool,
    henderson_length: Option<usize>,
    lower_sigma: f64,
    upper_sigma: f64,
    sigma_scope: SigmaScope,
}

impl X11Context {
    /// Build the context for a series of the given annual frequency.
    pub fn new(spec: &X11Spec, period: usize) -> Result<Self> {
        spec.validate(period)?;
        let final_filters = if spec.final_seasonal_filters.len() == period {
            spec.final_seasonal_filters.clone()
        } else {
            vec![spec.final_seasonal_filters[0]; period]
        };
        Ok(Self {
            period,
            mode: spec.mode,
            ops: spec.mode.ops(),
            initial_filter: spec.initial_seasonal_filter,
            final_filters,
            msr_per_position: spec.msr_per_position,
            henderson_length: spec.henderson_length,
            lower_sigma: spec.lower_sigma,
            upper_sigma: spec.upper_sigma,
            sigma_scope: spec.sigma_scope,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn mode(&self) -> DecompositionMode {
        self.mode
    }

    pub fn ops(&self) -> ModeOps {
        self.ops
    }

    /// Fixed Henderson length, or `None` for automatic selection.
    pub fn henderson_length(&self) -> Option<usize> {
        self.henderson_length
    }

    pub fn msr_per_position(&self) -> bool {
        self.msr_per_position
    }

    /// First-pass seasonal filter for every position.
    pub fn initial_filters(&self) -> Vec<SeasonalFilterKind> {
        vec![self.initial_filter; self.period]
    }

    /// Final-pass seasonal filters, resolving MSR options from the decision
    /// of the previous step (or the X-11 default when there is none).
    pub fn final_filters(&self, previous: Option<&MsrDecision>) -> Vec<SeasonalFilterKind> {
        self.final_filters
            .iter()
            .enumerate()
            .map(|(position, option)| match option {
                SeasonalFilterOption::Fixed(kind) => *kind,
                SeasonalFilterOption::Msr => previous
                    .and_then(|d| d.filters().get(position).copied())
                    .unwrap_or(DEFAULT_FINAL_FILTER),
            })
            .collect()
    }

    /// Extreme-value corrector configured with this run's sigma limits.
    pub fn extreme_corrector(&self) -> ExtremeValuesCorrector {
        ExtremeValuesCorrector::new(self.lower_sigma, self.upper_sigma, self.sigma_scope)
    }
}
