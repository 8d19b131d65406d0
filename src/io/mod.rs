//! Input/output helpers.
//!
//! - Caliper JSON ingest + latest-file discovery (`ingest`)
//! - summary/report exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
