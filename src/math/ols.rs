//! Unconstrained least squares helpers.
//!
//! The NNLS solver repeatedly solves small problems of the form
//!
//! ```text
//! minimize ||E_P z - f||^2
//! ```
//!
//! over the currently active columns `E_P`. The closed form is
//! `z = (E_P^T E_P)^{-1} E_P^T f`; we solve it through a Cholesky factorization
//! of the normal matrix, and fall back to SVD when the active columns are
//! (numerically) collinear, which is common for `1` vs `log n` at small `n`.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve the normal equations `(X^T X) b = X^T y`.
///
/// Uses Cholesky when `X^T X` is positive definite, SVD on `X` otherwise.
pub fn solve_normal_equations(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.ncols() == 0 {
        return Some(DVector::zeros(0));
    }
    let xtx = x.tr_mul(x);
    let xty = x.tr_mul(y);
    if let Some(chol) = xtx.cholesky() {
        let beta = chol.solve(&xty);
        if beta.iter().all(|v| v.is_finite()) {
            return Some(beta);
        }
    }
    solve_least_squares(x, y)
}

/// Root-mean-square of `y - X b`; `0` for an empty system.
pub fn residual_rms(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let r = y - x * beta;
    (r.norm_squared() / y.len() as f64).sqrt()
}
