//! Error types.
//!
//! Two layers:
//!
//! - typed analysis failures (`AggregateError`, `SolverError`, `TrendError`) that
//!   the core returns so callers can decide whether to skip one group or abort
//! - `AppError`, the process-level error carrying an exit code for the binary

use thiserror::Error;

/// Which metadata field disagreed inside one accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Unit,
    Description,
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataField::Unit => f.write_str("unit"),
            MetadataField::Description => f.write_str("description"),
        }
    }
}

/// Mixing measurements of different units or descriptions into one accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("inconsistent {field}: expected '{expected}', found '{found}'")]
    Inconsistent {
        field: MetadataField,
        expected: String,
        found: String,
    },
}

/// Failures of the least squares solvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("normal matrix is singular (even after regularization)")]
    Singular,
    #[error("design matrix or target contains non-finite values")]
    NonFinite,
    #[error("dimension mismatch: {rows} design rows vs {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },
}

/// A failed trend fit for one group-by leaf.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrendError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("no growth functions enabled")]
    EmptyBasis,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        AppError::new(4, err.to_string())
    }
}
