//! # anofox-x11
//!
//! X-11 seasonal adjustment in Rust.
//!
//! Decomposes a regularly spaced series into trend-cycle, seasonal and
//! irregular components with the iterated B/C/D filtering passes of X-11:
//! seasonal moving averages selected from the moving seasonality ratio,
//! Henderson trend filters with Musgrave end weights, and extreme-value
//! robustification, in additive, multiplicative, log-additive and
//! pseudo-additive modes.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod filters;
pub mod utils;
pub mod x11;

pub use error::{Result, ValidationError, X11Error};

pub mod prelude {
    pub use crate::core::Series;
    pub use crate::error::{Result, ValidationError, X11Error};
    pub use crate::filters::SeasonalFilterKind;
    pub use crate::x11::{
        DecompositionMode, SeasonalFilterOption, SigmaScope, StepKind, X11Kernel, X11Results,
        X11Spec,
    };
}
