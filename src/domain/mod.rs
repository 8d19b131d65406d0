//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loader-facing records (`Trial`, `Scenario`, `Measurement`) and the validated `CompleteTrial`
//! - configuration (`TrendConfig`, `SummaryConfig`, `AnalyzeConfig`, `GrowthFunction`, `SolverKind`)
//! - report outputs (`SummaryRow`, `TrendFit`, `AnalysisReport`, etc.)

pub mod types;

pub use types::*;
