//! Tikhonov-regularized (ridge) least squares.
//!
//! Closed form, no iteration:
//!
//! ```text
//! w = (M^T M + λ I)^{-1} M^T t
//! ```
//!
//! `λ > 0` keeps the normal matrix invertible when basis columns are nearly
//! collinear; the price is a small shrinkage of every coefficient towards zero.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;

/// Solve the ridge problem for design `m` and target `t`.
pub fn tikhonov_least_squares(m: &DMatrix<f64>, t: &DVector<f64>, lambda: f64) -> Result<DVector<f64>, SolverError> {
    if m.nrows() != t.len() {
        return Err(SolverError::DimensionMismatch {
            rows: m.nrows(),
            targets: t.len(),
        });
    }
    if !lambda.is_finite() || m.iter().chain(t.iter()).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite);
    }

    let dof = m.ncols();
    let mut normal = m.tr_mul(m);
    for i in 0..dof {
        normal[(i, i)] += lambda;
    }
    let inverse = normal.try_inverse().ok_or(SolverError::Singular)?;
    let w = inverse * m.tr_mul(t);
    if w.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::Singular);
    }
    Ok(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lambda_is_ordinary_least_squares() {
        // y = 2 + 3x on x = [0,1,2]
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let t = DVector::from_row_slice(&[2.0, 5.0, 8.0]);
        let w = tikhonov_least_squares(&m, &t, 0.0).unwrap();
        assert!((w[0] - 2.0).abs() < 1e-10);
        assert!((w[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn regularization_shrinks_coefficients() {
        let m = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let t = DVector::from_row_slice(&[2.0, 4.0, 6.0]);
        // M^T M = 14, M^T t = 28 -> w = 28 / (14 + λ)
        let w = tikhonov_least_squares(&m, &t, 0.1).unwrap();
        assert!((w[0] - 28.0 / 14.1).abs() < 1e-12);
        assert!(w[0] < 2.0);
    }

    #[test]
    fn collinear_columns_are_solvable_with_positive_lambda() {
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let t = DVector::from_row_slice(&[4.0, 4.0, 4.0]);
        assert_eq!(tikhonov_least_squares(&m, &t, 0.0), Err(SolverError::Singular));
        let w = tikhonov_least_squares(&m, &t, 0.1).unwrap();
        // Symmetric columns share the weight equally.
        assert!((w[0] - w[1]).abs() < 1e-12);
        // (3 + 3 + λ) w = 12 for each column.
        assert!((w[0] + w[1] - 24.0 / 6.1).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        let m = DMatrix::from_row_slice(2, 1, &[1.0, f64::INFINITY]);
        let t = DVector::from_row_slice(&[1.0, 2.0]);
        assert_eq!(tikhonov_least_squares(&m, &t, 0.1), Err(SolverError::NonFinite));

        let m = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let t = DVector::from_row_slice(&[1.0]);
        assert!(matches!(
            tikhonov_least_squares(&m, &t, 0.1),
            Err(SolverError::DimensionMismatch { rows: 2, targets: 1 })
        ));
    }
}
