//! Utility functions shared by the decomposition steps.

pub mod stats;

pub use stats::{linear_fit_at, mean, mean_abs_change, median, robust_scale};
