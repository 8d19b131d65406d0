//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env`
//! - installs logging
//! - runs the analysis pipeline
//! - prints reports
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::Cli;
use crate::domain::{AnalyzeConfig, NnlsOptions, SummaryConfig, TrendConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment override for the default results directory.
pub const RESULTS_DIR_ENV: &str = "BENCH_RESULTS_DIR";

/// Entry point for the `bench-analyze` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    crate::logging::init(&cli.log_level, cli.log_format)?;

    let config = analyze_config_from_args(&cli, std::env::var_os(RESULTS_DIR_ENV).map(PathBuf::from))?;
    let report = pipeline::run_analysis(&config)?;

    print!("{}", crate::report::format_overview(&report));
    print!("{}", crate::report::format_summary(&report.rows));
    if !report.failures.is_empty() {
        print!("{}", crate::report::format_failures(&report.failures));
    }
    if config.trends_enabled {
        print!("{}", crate::report::format_trends(&report.trends));
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_summary_csv(path, &report)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_report_json(path, &report)?;
    }

    Ok(())
}

/// Build the run configuration from parsed flags.
///
/// `env_results_dir` is the value of `BENCH_RESULTS_DIR`, if set; an explicit
/// `--results-dir` wins over it.
pub fn analyze_config_from_args(cli: &Cli, env_results_dir: Option<PathBuf>) -> Result<AnalyzeConfig, AppError> {
    if !(cli.lambda.is_finite() && cli.lambda >= 0.0) {
        return Err(AppError::new(2, format!("--lambda must be >= 0, got {}", cli.lambda)));
    }
    if !(cli.nnls_tolerance.is_finite() && cli.nnls_tolerance > 0.0) {
        return Err(AppError::new(
            2,
            format!("--nnls-tolerance must be > 0, got {}", cli.nnls_tolerance),
        ));
    }
    if !cli.prune_threshold.is_finite() {
        return Err(AppError::new(2, "--prune-threshold must be finite"));
    }
    if cli.basis.is_empty() {
        return Err(AppError::new(2, "--basis needs at least one growth function"));
    }

    let mut basis = Vec::with_capacity(cli.basis.len());
    for f in &cli.basis {
        if !basis.contains(f) {
            basis.push(*f);
        }
    }

    let results_dir = match (&cli.results_dir, env_results_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => dir,
        (None, None) => default_results_dir()?,
    };

    Ok(AnalyzeConfig {
        inputs: cli.files.clone(),
        results_dir,
        summary: SummaryConfig { strict: cli.strict },
        trend: TrendConfig {
            solver: cli.solver,
            lambda: cli.lambda,
            nnls: NnlsOptions {
                tolerance: cli.nnls_tolerance,
                max_iterations: cli.nnls_max_iter,
            },
            merge_targets: cli.merge,
            min_distinct_values: cli.min_distinct,
            basis,
            prune_threshold: cli.prune_threshold,
            weighted: cli.weighted,
        },
        trends_enabled: !cli.no_trends,
        export_csv: cli.export.clone(),
        export_json: cli.json.clone(),
    })
}

/// `$HOME/.caliper/results`, Caliper's own output location.
fn default_results_dir() -> Result<PathBuf, AppError> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        AppError::new(
            2,
            format!("HOME is not set; pass --results-dir or set {RESULTS_DIR_ENV}."),
        )
    })?;
    Ok(PathBuf::from(home).join(".caliper").join("results"))
}
