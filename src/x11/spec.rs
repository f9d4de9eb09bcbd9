//! X-11 configuration.

use super::mode::DecompositionMode;
use crate::error::{Result, ValidationError};
use crate::filters::SeasonalFilterKind;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seasonal filter requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeasonalFilterOption {
    /// Choose 3×3, 3×5 or 3×9 from the moving seasonality ratio.
    #[default]
    Msr,
    /// Always use the given filter.
    Fixed(SeasonalFilterKind),
}

/// How the scale of the irregular is estimated for extreme-value detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SigmaScope {
    /// One centre and scale per within-cycle position.
    #[default]
    PerPosition,
    /// A single centre and scale over all observations.
    Pooled,
}

/// Configuration of an X-11 decomposition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct X11Spec {
    /// Decomposition mode.
    pub mode: DecompositionMode,
    /// Seasonal filter of the first pass of each step.
    pub initial_seasonal_filter: SeasonalFilterKind,
    /// Seasonal filter of the final pass, per within-cycle position when
    /// more than one value is given.
    pub final_seasonal_filters: Vec<SeasonalFilterOption>,
    /// Apply the MSR selection to each position separately.
    pub msr_per_position: bool,
    /// Henderson filter length; `None` selects it from the I/C ratio.
    pub henderson_length: Option<usize>,
    /// Lower sigma limit for extreme-value down-weighting.
    pub lower_sigma: f64,
    /// Upper sigma limit beyond which values get zero weight.
    pub upper_sigma: f64,
    /// Scope of the extreme-value scale estimate.
    pub sigma_scope: SigmaScope,
}

impl Default for X11Spec {
    fn default() -> Self {
        Self {
            mode: DecompositionMode::default(),
            initial_seasonal_filter: SeasonalFilterKind::S3x3,
            final_seasonal_filters: vec![SeasonalFilterOption::Msr],
            msr_per_position: false,
            henderson_length: None,
            lower_sigma: 1.5,
            upper_sigma: 2.5,
            sigma_scope: SigmaScope::PerPosition,
        }
    }
}

impl X11Spec {
    pub fn new(mode: DecompositionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the decomposition mode.
    pub fn with_mode(mut self, mode: DecompositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the first-pass seasonal filter.
    pub fn with_initial_seasonal_filter(mut self, kind: SeasonalFilterKind) -> Self {
        self.initial_seasonal_filter = kind;
        self
    }

    /// Use the same final seasonal filter for every position.
    pub fn with_final_seasonal_filter(mut self, option: SeasonalFilterOption) -> Self {
        self.final_seasonal_filters = vec![option];
        self
    }

    /// Use one final seasonal filter per within-cycle position.
    pub fn with_final_seasonal_filters(mut self, options: Vec<SeasonalFilterOption>) -> Self {
        self.final_seasonal_filters = options;
        self
    }

    /// Resolve MSR selections per position instead of globally.
    pub fn with_msr_per_position(mut self, enabled: bool) -> Self {
        self.msr_per_position = enabled;
        self
    }

    /// Fix the Henderson filter length.
    pub fn with_henderson_length(mut self, length: usize) -> Self {
        self.henderson_length = Some(length);
        self
    }

    /// Select the Henderson filter length automatically.
    pub fn with_automatic_henderson(mut self) -> Self {
        self.henderson_length = None;
        self
    }

    /// Set the sigma limits for extreme-value correction.
    pub fn with_sigma_limits(mut self, lower: f64, upper: f64) -> Self {
        self.lower_sigma = lower;
        self.upper_sigma = upper;
        self
    }

    pub fn with_sigma_scope(mut self, scope: SigmaScope) -> Self {
        self.sigma_scope = scope;
        self
    }

    /// Check the configuration against a series frequency.
    pub fn validate(&self, period: usize) -> Result<()> {
        if !(self.lower_sigma > 0.0 && self.lower_sigma < self.upper_sigma) {
            return Err(ValidationError::InvalidParameter(format!(
                "sigma limits must satisfy 0 < lower < upper, got ({}, {})",
                self.lower_sigma, self.upper_sigma
            ))
            .into());
        }
        if let Some(length) = self.henderson_length {
            if length < 5 || length % 2 == 0 || length > 101 {
                return Err(ValidationError::InvalidParameter(format!(
                    "Henderson length must be odd and between 5 and 101, got {}",
                    length
                ))
                .into());
            }
        }
        let n = self.final_seasonal_filters.len();
        if n != 1 && n != period {
            return Err(ValidationError::InvalidParameter(format!(
                "expected 1 or {} final seasonal filters, got {}",
                period, n
            ))
            .into());
        }
        Ok(())
    }
}
