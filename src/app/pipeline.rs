//! Shared analysis pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve inputs -> load trials -> index variates -> summarize -> fit trends
//!
//! The binary then only has to print and export the returned report.

use std::path::PathBuf;

use tracing::info;

use crate::domain::{AnalysisReport, AnalyzeConfig, Trial};
use crate::error::AppError;
use crate::fit::predict_trends;
use crate::io::ingest::{find_latest_results_file, load_trials};
use crate::summary::{VariateIndex, summarize};

/// Explicit files, or the newest file in the results directory.
pub fn resolve_inputs(config: &AnalyzeConfig) -> Result<Vec<PathBuf>, AppError> {
    if !config.inputs.is_empty() {
        return Ok(config.inputs.clone());
    }
    Ok(vec![find_latest_results_file(&config.results_dir)?])
}

/// Execute the full pipeline and return the computed report.
pub fn run_analysis(config: &AnalyzeConfig) -> Result<AnalysisReport, AppError> {
    let inputs = resolve_inputs(config)?;
    let trials = load_trials(&inputs)?;
    analyze_trials(trials, config)
}

/// Run the analysis on already-loaded trials.
pub fn analyze_trials(trials: Vec<Trial>, config: &AnalyzeConfig) -> Result<AnalysisReport, AppError> {
    let index = VariateIndex::build(trials);
    if index.trials().is_empty() {
        return Err(AppError::new(3, "No complete trials to analyze."));
    }
    info!(
        trials = index.trials().len(),
        dropped = index.dropped(),
        variates = index.variates().len(),
        "indexed trials"
    );

    let summary = summarize(&index, &config.summary)?;

    let trends = if config.trends_enabled {
        predict_trends(&index, &config.trend)
    } else {
        Vec::new()
    };

    Ok(AnalysisReport {
        trials_used: index.trials().len(),
        trials_dropped: index.dropped(),
        variates: index.variates().iter().map(|v| v.info()).collect(),
        rows: summary.rows,
        failures: summary.failures,
        trends,
    })
}
