//! Growth-model selection by iterative pruning.
//!
//! Starting from the enabled basis we repeatedly:
//!
//! 1. solve the regression (ridge or NNLS) over the current basis
//! 2. score each function by its fitted coefficient
//! 3. drop the lowest-scoring function if its score is below
//!    `prune_threshold` times the mean score magnitude
//!
//! until nothing is dropped or a single function remains. Each round removes one
//! function, so the loop runs at most `basis.len()` times. Negative coefficients
//! always fall below the threshold, which removes physically meaningless
//! "negative growth" terms first.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{FittedTerm, GrowthFunction, SolverKind, TrendConfig};
use crate::error::TrendError;
use crate::fit::dataset::TrendDataset;
use crate::math::{design_matrix, nnls, residual_rms, tikhonov_least_squares};

/// Output of pruning + fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    /// Surviving functions, in basis order.
    pub basis: Vec<GrowthFunction>,
    /// Surviving functions with a non-zero coefficient.
    pub terms: Vec<FittedTerm>,
    /// RMS residual of the final model (unweighted).
    pub rmse: f64,
    /// Solver rounds performed.
    pub rounds: usize,
    /// `false` if any NNLS solve hit its iteration cap.
    pub converged: bool,
}

/// Fit `dataset` and prune the basis per `config`.
pub fn select_model(dataset: &TrendDataset, config: &TrendConfig) -> Result<ModelSelection, TrendError> {
    if config.basis.is_empty() {
        return Err(TrendError::EmptyBasis);
    }

    let y = DVector::from_column_slice(dataset.values());
    let mut basis = config.basis.clone();
    let mut rounds = 0usize;
    let mut converged = true;

    let (design, coefficients) = loop {
        rounds += 1;
        let design = design_matrix(dataset.targets(), &basis);
        let (coefficients, ok) = solve(&design, &y, dataset.weights(), config)?;
        converged &= ok;

        match weakest(coefficients.as_slice(), config.prune_threshold) {
            Some(worst) if basis.len() > 1 => {
                debug!(
                    dropped = basis[worst].display_name(),
                    score = coefficients[worst],
                    "pruning growth function"
                );
                basis.remove(worst);
            }
            _ => break (design, coefficients),
        }
    };

    let rmse = residual_rms(&design, &y, &coefficients);
    let terms = basis
        .iter()
        .zip(coefficients.iter())
        .filter(|(_, c)| **c != 0.0)
        .map(|(&function, &coefficient)| FittedTerm { function, coefficient })
        .collect();

    Ok(ModelSelection {
        basis,
        terms,
        rmse,
        rounds,
        converged,
    })
}

/// Index of the function to drop, if any falls below the threshold.
fn weakest(scores: &[f64], threshold: f64) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    let mean_magnitude = scores.iter().map(|s| s.abs()).sum::<f64>() / scores.len() as f64;
    if !mean_magnitude.is_finite() {
        return None;
    }
    let (worst, &score) = scores
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    (score < threshold * mean_magnitude).then_some(worst)
}

fn solve(
    design: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: &[f64],
    config: &TrendConfig,
) -> Result<(DVector<f64>, bool), TrendError> {
    let (design, y) = if config.weighted {
        scale_rows(design, y, weights)
    } else {
        (design.clone(), y.clone())
    };

    match config.solver {
        SolverKind::Ridge => Ok((tikhonov_least_squares(&design, &y, config.lambda)?, true)),
        SolverKind::Nnls => {
            let sol = nnls(&design, &y, &config.nnls)?;
            Ok((sol.x, sol.converged))
        }
    }
}

/// Multiply each row (and target) by `sqrt(weight)`.
fn scale_rows(design: &DMatrix<f64>, y: &DVector<f64>, weights: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
    let mut xw = design.clone();
    let mut yw = y.clone();
    for (i, w) in weights.iter().enumerate() {
        let sw = w.sqrt();
        xw.row_mut(i).scale_mut(sw);
        yw[i] *= sw;
    }
    (xw, yw)
}
