//! Grouped statistics for the tabular report.
//!
//! - online weighted statistics (`aggregate`)
//! - variate discovery and ordering (`variates`)
//! - lazy group-path enumeration (`traversal`)
//! - the group-by summary itself (`recursive`)

pub mod aggregate;
pub mod recursive;
pub mod traversal;
pub mod variates;

pub use aggregate::*;
pub use recursive::*;
pub use traversal::*;
pub use variates::*;
