//! Growth functions used as the regression basis.
//!
//! Each function maps the numeric variate value `n` to one design column:
//!
//! - `1`, `log2 n`, `ln n`, `log10 n`
//! - `n`, `n log2 n`, `n^2`, `n^3`
//! - `2^n`
//!
//! Logarithmic terms map non-positive `n` to `0` rather than `-inf`/NaN.

use nalgebra::DMatrix;

use crate::domain::GrowthFunction;

impl GrowthFunction {
    /// Evaluate the function at `n`.
    pub fn evaluate(self, n: f64) -> f64 {
        match self {
            GrowthFunction::Const => 1.0,
            GrowthFunction::Log2n => positive_or_zero(n, f64::log2),
            GrowthFunction::Logen => positive_or_zero(n, f64::ln),
            GrowthFunction::Log10n => positive_or_zero(n, f64::log10),
            GrowthFunction::Linear => n,
            GrowthFunction::Nlog2n => positive_or_zero(n, |n| n * n.log2()),
            GrowthFunction::Quadratic => n * n,
            GrowthFunction::Cubic => n * n * n,
            GrowthFunction::Exp2n => n.exp2(),
        }
    }
}

fn positive_or_zero(n: f64, f: impl Fn(f64) -> f64) -> f64 {
    if n > 0.0 { f(n) } else { 0.0 }
}

/// Build the design matrix: one row per target, one column per function.
pub fn design_matrix(targets: &[f64], basis: &[GrowthFunction]) -> DMatrix<f64> {
    DMatrix::from_fn(targets.len(), basis.len(), |i, j| basis[j].evaluate(targets[i]))
}
