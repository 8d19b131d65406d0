//! Non-negative least squares.
//!
//! Solves `min ||E x - f||` subject to `x >= 0` with the active-set method of
//! Lawson & Hanson ("Algorithm NNLS", *Solving Least Squares Problems*, 1974).
//!
//! Indices are split into the active set `P` (coefficients allowed to be
//! non-zero) and the passive set `Z` (held at zero). Starting from `P = {}`:
//!
//! 1. `w = E^T (f - E x)`
//! 2. pick the passive index with the largest `w_j > tol`; none means optimal
//! 3. move it to `P` and solve the unconstrained problem on `P`
//! 4. if the solution `z` has components `< -tol`, step `x` towards `z` by the
//!    largest feasible `alpha`, drop every active index that reached zero and
//!    re-solve; otherwise accept `z` and go back to 1
//!
//! The iteration cap counts outer and inner iterations together. Hitting it is
//! not an error: the current (feasible) iterate is returned with `converged = false`.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use crate::domain::NnlsOptions;
use crate::error::SolverError;
use crate::math::ols::solve_normal_equations;

#[derive(Debug, Clone, PartialEq)]
pub struct NnlsSolution {
    pub x: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

pub fn nnls(e: &DMatrix<f64>, f: &DVector<f64>, opts: &NnlsOptions) -> Result<NnlsSolution, SolverError> {
    if e.nrows() != f.len() {
        return Err(SolverError::DimensionMismatch {
            rows: e.nrows(),
            targets: f.len(),
        });
    }
    if e.iter().chain(f.iter()).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite);
    }

    let dof = e.ncols();
    let tol = opts.tolerance;

    let mut x = DVector::<f64>::zeros(dof);
    let mut active: Vec<usize> = Vec::with_capacity(dof);
    let mut is_active = vec![false; dof];
    let mut iterations = 0usize;
    let mut converged = true;

    'outer: while active.len() < dof {
        iterations += 1;
        if iterations > opts.max_iterations {
            converged = false;
            break;
        }

        let w = e.tr_mul(&(f - e * &x));

        let mut entering: Option<usize> = None;
        let mut max_w = tol;
        for j in (0..dof).filter(|&j| !is_active[j]) {
            if w[j] > max_w {
                max_w = w[j];
                entering = Some(j);
            }
        }
        let Some(t) = entering else {
            break;
        };
        active.push(t);
        is_active[t] = true;

        loop {
            iterations += 1;
            if iterations > opts.max_iterations {
                converged = false;
                break 'outer;
            }

            let ep = e.select_columns(&active);
            let z = solve_normal_equations(&ep, f).ok_or(SolverError::Singular)?;

            let mut alpha = f64::INFINITY;
            for (k, &j) in active.iter().enumerate() {
                if z[k] < -tol {
                    alpha = alpha.min(x[j] / (x[j] - z[k]));
                }
            }

            if alpha.is_infinite() {
                for (k, &j) in active.iter().enumerate() {
                    x[j] = if z[k] > tol { z[k] } else { 0.0 };
                }
                break;
            }

            for (k, &j) in active.iter().enumerate() {
                x[j] += alpha * (z[k] - x[j]);
            }
            active.retain(|&j| {
                if x[j].abs() < tol {
                    x[j] = 0.0;
                    is_active[j] = false;
                    false
                } else {
                    true
                }
            });
        }
    }

    if !converged {
        warn!(
            max_iterations = opts.max_iterations,
            "NNLS iteration cap hit, returning current iterate"
        );
    }

    Ok(NnlsSolution {
        x,
        iterations,
        converged,
    })
}
