//! `bench-analyze` library crate.
//!
//! The binary (`bench-analyze`) is a thin wrapper around this library so that:
//!
//! - the statistics and regression core is testable without spawning processes
//! - callers can feed already-loaded trials straight into `app::pipeline`

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
pub mod summary;
