//! The X-11 seasonal adjustment kernel.
//!
//! This module provides:
//! - Decomposition modes and their arithmetic
//! - Trend-cycle estimation with automatic Henderson length selection
//! - Seasonal filtering, normalization and MSR based filter selection
//! - Extreme-value detection and robustification
//! - The B, C and D passes and the kernel running them

mod context;
pub mod extreme;
mod kernel;
mod mode;
pub mod msr;
pub mod normalizer;
pub mod seasonal;
mod spec;
pub mod step;
pub mod trend;

pub use context::{X11Context, DEFAULT_FINAL_FILTER};
pub use extreme::{Corrections, ExtremeValuesAnalysis, ExtremeValuesCorrector};
pub use kernel::{FinalDecomposition, X11Kernel, X11Results, SUPPORTED_PERIODS};
pub use mode::{DecompositionMode, ModeOps};
pub use msr::{MsrDecision, MsrEntry, MsrTable};
pub use spec::{SeasonalFilterOption, SigmaScope, X11Spec};
pub use step::{StepKind, StepPlan, StepTables};
pub use trend::TrendEstimate;
