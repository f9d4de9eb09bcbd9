//! Linear filters used by the X-11 decomposition.
//!
//! This module provides:
//! - Symmetric and finite (end-point) linear filters
//! - Henderson trend-cycle filters
//! - Musgrave asymmetric end filters
//! - X-11 seasonal moving averages (3×3, 3×5, 3×9)

mod henderson;
mod linear;
mod musgrave;
mod seasonal;

pub use henderson::henderson;
pub use linear::{apply_with_end_filters, FiniteFilter, SymmetricFilter};
pub use musgrave::{musgrave_filter, musgrave_filters};
pub use seasonal::{SeasonalFilterKind, SeasonalMovingAverage};
