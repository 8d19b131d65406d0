//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed over by the loader (possibly partially populated)
//! - used in-memory by the summarizer and the trend fitter
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Synthetic variate key for the benchmark method name.
pub const BENCHMARK_METHOD: &str = "BenchmarkMethod";
/// Synthetic variate key for the benchmark class name.
pub const BENCHMARK_CLASS: &str = "BenchmarkClass";

/// One observed sample.
///
/// `magnitude` is the raw recorded value, `weight` usually the repetition count,
/// so the per-unit value is `magnitude / weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub magnitude: f64,
    pub unit: String,
    pub weight: f64,
    pub description: String,
}

impl Measurement {
    pub fn new(magnitude: f64, unit: impl Into<String>, weight: f64, description: impl Into<String>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
            weight,
            description: description.into(),
        }
    }

    /// Per-unit value `magnitude / weight`.
    pub fn per_unit(&self) -> f64 {
        self.magnitude / self.weight
    }
}

/// The configuration a trial ran under, as delivered by the loader.
///
/// Any field may be missing when the source file was truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub parameters: Option<BTreeMap<String, String>>,
}

/// One benchmark run as delivered by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub scenario: Option<Scenario>,
    pub measurements: Vec<Measurement>,
}

impl Trial {
    /// Validate the scenario; `None` if any required field is missing.
    pub fn complete(self) -> Option<CompleteTrial> {
        let scenario = self.scenario?;
        Some(CompleteTrial {
            class_name: scenario.class_name?,
            method_name: scenario.method_name?,
            parameters: scenario.parameters?,
            measurements: self.measurements,
        })
    }
}

/// A trial whose scenario is fully known. The core pipeline only sees these.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteTrial {
    pub class_name: String,
    pub method_name: String,
    pub parameters: BTreeMap<String, String>,
    pub measurements: Vec<Measurement>,
}

impl CompleteTrial {
    /// Look up a parameter value, falling back to the synthetic keys.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.parameters.get(key) {
            return Some(v.as_str());
        }
        match key {
            BENCHMARK_METHOD => Some(self.method_name.as_str()),
            BENCHMARK_CLASS => Some(self.class_name.as_str()),
            _ => None,
        }
    }

    /// All `(key, value)` pairs including the synthetic keys.
    pub fn keyed_values(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            (BENCHMARK_METHOD, self.method_name.as_str()),
            (BENCHMARK_CLASS, self.class_name.as_str()),
        ]
        .into_iter()
        .filter(|(key, _)| !self.parameters.contains_key(*key))
        .chain(self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Candidate growth functions for trend fitting.
///
/// The set is closed; evaluation lives in `math::basis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GrowthFunction {
    Const,
    Log2n,
    Logen,
    Log10n,
    Linear,
    Nlog2n,
    Quadratic,
    Cubic,
    Exp2n,
}

impl GrowthFunction {
    pub const ALL: [GrowthFunction; 9] = [
        GrowthFunction::Const,
        GrowthFunction::Log2n,
        GrowthFunction::Logen,
        GrowthFunction::Log10n,
        GrowthFunction::Linear,
        GrowthFunction::Nlog2n,
        GrowthFunction::Quadratic,
        GrowthFunction::Cubic,
        GrowthFunction::Exp2n,
    ];

    /// Enabled by default. More terms need more samples than a typical sweep has.
    pub const DEFAULT_BASIS: [GrowthFunction; 5] = [
        GrowthFunction::Const,
        GrowthFunction::Log2n,
        GrowthFunction::Linear,
        GrowthFunction::Nlog2n,
        GrowthFunction::Quadratic,
    ];

    /// Big-O label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            GrowthFunction::Const => "O(1)",
            GrowthFunction::Log2n => "O(log n)",
            GrowthFunction::Logen => "O(ln n)",
            GrowthFunction::Log10n => "O(log10 n)",
            GrowthFunction::Linear => "O(n)",
            GrowthFunction::Nlog2n => "O(n log n)",
            GrowthFunction::Quadratic => "O(n^2)",
            GrowthFunction::Cubic => "O(n^3)",
            GrowthFunction::Exp2n => "O(2^n)",
        }
    }
}

/// Which regression backs the trend fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Tikhonov-regularized least squares.
    Ridge,
    /// Non-negative least squares (active set).
    Nnls,
}

/// Active-set solver knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NnlsOptions {
    /// Threshold for "positive" gradients and "zero" coefficients.
    pub tolerance: f64,
    /// Cap on total (outer + inner) iterations.
    pub max_iterations: usize,
}

impl Default for NnlsOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 1000,
        }
    }
}

/// Everything the trend fitter needs, passed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    pub solver: SolverKind,
    /// Ridge parameter λ.
    pub lambda: f64,
    pub nnls: NnlsOptions,
    /// Fold repeated targets into one weighted mean.
    pub merge_targets: bool,
    /// Skip variates with fewer distinct values than this.
    pub min_distinct_values: usize,
    /// Enabled growth functions, in basis order.
    pub basis: Vec<GrowthFunction>,
    /// Drop the weakest function while its score is below this share of the mean score.
    pub prune_threshold: f64,
    /// Scale rows by `sqrt(weight)` before solving.
    pub weighted: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            solver: SolverKind::Ridge,
            lambda: 0.1,
            nnls: NnlsOptions::default(),
            merge_targets: false,
            min_distinct_values: 8,
            basis: GrowthFunction::DEFAULT_BASIS.to_vec(),
            prune_threshold: 0.1,
            weighted: false,
        }
    }
}

/// Group-by summary knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryConfig {
    /// Abort on the first inconsistent group instead of skipping it.
    pub strict: bool,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Result files. Empty means "latest file in `results_dir`".
    pub inputs: Vec<PathBuf>,
    pub results_dir: PathBuf,
    pub summary: SummaryConfig,
    pub trend: TrendConfig,
    pub trends_enabled: bool,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Read-only snapshot of a `WeightedAggregate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub unit: String,
    pub description: String,
    pub mean: f64,
    /// Undefined with fewer than two effective samples.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

/// One emitted group-by row: fixed variate values, the leaf value, its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub path: Vec<String>,
    pub value: String,
    pub summary: AggregateSummary,
}

/// A group-by leaf that could not be aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFailure {
    pub path: Vec<String>,
    pub value: String,
    pub message: String,
}

/// One surviving basis function and its coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedTerm {
    pub function: GrowthFunction,
    pub coefficient: f64,
}

/// Trend fit for one fixed combination of the other variates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub path: Vec<String>,
    pub unit: String,
    pub description: String,
    /// Number of `(target, value)` pairs the fit saw.
    pub samples: usize,
    pub terms: Vec<FittedTerm>,
    pub rmse: f64,
    /// `false` when the NNLS iteration cap was hit.
    pub converged: bool,
}

/// Outcome of one trend leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrendLeaf {
    Fitted(TrendFit),
    Failed { path: Vec<String>, message: String },
}

/// All trend leaves for one modeled variate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub variate: String,
    pub leaves: Vec<TrendLeaf>,
}

/// Variate metadata as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariateInfo {
    pub key: String,
    pub values: Vec<String>,
    pub numeric: bool,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub trials_used: usize,
    pub trials_dropped: usize,
    /// Variates in recursion order.
    pub variates: Vec<VariateInfo>,
    pub rows: Vec<SummaryRow>,
    pub failures: Vec<GroupFailure>,
    pub trends: Vec<TrendReport>,
}
