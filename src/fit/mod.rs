//! Trend fitting.
//!
//! - `dataset`: `(target, value, weight)` observations for one leaf
//! - `selection`: basis pruning over ridge / NNLS solves
//! - `fitter`: per-variate orchestration (parallel across variates)

pub mod dataset;
pub mod fitter;
pub mod selection;

pub use dataset::*;
pub use fitter::*;
pub use selection::*;
