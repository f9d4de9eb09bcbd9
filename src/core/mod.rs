//! Core data structures for seasonal decomposition.

mod series;

pub use series::Series;
