//! Command-line parsing for the benchmark result analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! statistics/regression code; `app` turns `Cli` into an `AnalyzeConfig`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{GrowthFunction, SolverKind};
use crate::logging::LogFormat;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "bench-analyze",
    version,
    about = "Summarize Caliper benchmark results and fit growth trends"
)]
pub struct Cli {
    /// Result files to analyze. Defaults to the newest file in the results directory.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Directory searched for the newest results file (env: BENCH_RESULTS_DIR).
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Regression used for trend fits.
    #[arg(long, value_enum, default_value_t = SolverKind::Ridge)]
    pub solver: SolverKind,

    /// Ridge regularization λ.
    #[arg(long, default_value_t = 0.1)]
    pub lambda: f64,

    /// NNLS gradient/zero tolerance.
    #[arg(long, default_value_t = 0.01)]
    pub nnls_tolerance: f64,

    /// NNLS iteration cap (outer + inner).
    #[arg(long = "nnls-max-iter", default_value_t = 1000)]
    pub nnls_max_iter: usize,

    /// Fold measurements at identical variate values into one weighted mean.
    #[arg(long)]
    pub merge: bool,

    /// Minimum distinct values before a numeric variate gets a trend fit.
    #[arg(long, default_value_t = 8)]
    pub min_distinct: usize,

    /// Growth functions to fit (comma separated).
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = GrowthFunction::DEFAULT_BASIS
    )]
    pub basis: Vec<GrowthFunction>,

    /// Drop the weakest function while its coefficient is below this share of the mean.
    #[arg(long, default_value_t = 0.1)]
    pub prune_threshold: f64,

    /// Weight regression rows by measurement weight.
    #[arg(long)]
    pub weighted: bool,

    /// Skip trend fitting entirely.
    #[arg(long)]
    pub no_trends: bool,

    /// Abort on the first group with inconsistent units/descriptions.
    #[arg(long)]
    pub strict: bool,

    /// Export the full report as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Export the summary table as CSV.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. `info`, `debug`).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["bench-analyze"]);
        assert!(cli.files.is_empty());
        assert_eq!(cli.solver, SolverKind::Ridge);
        assert_eq!(cli.lambda, 0.1);
        assert_eq!(cli.nnls_max_iter, 1000);
        assert_eq!(cli.min_distinct, 8);
        assert_eq!(cli.basis, GrowthFunction::DEFAULT_BASIS.to_vec());
        assert!(!cli.merge && !cli.weighted && !cli.no_trends && !cli.strict);
    }

    #[test]
    fn parses_solver_and_basis_list() {
        let cli = Cli::parse_from([
            "bench-analyze",
            "a.json",
            "b.json.tmp",
            "--solver",
            "nnls",
            "--basis",
            "const,linear,quadratic,exp2n",
            "--merge",
        ]);
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.solver, SolverKind::Nnls);
        assert_eq!(
            cli.basis,
            vec![
                GrowthFunction::Const,
                GrowthFunction::Linear,
                GrowthFunction::Quadratic,
                GrowthFunction::Exp2n
            ]
        );
        assert!(cli.merge);
    }

    #[test]
    fn rejects_unknown_growth_function() {
        assert!(Cli::try_parse_from(["bench-analyze", "--basis", "factorial"]).is_err());
    }
}
