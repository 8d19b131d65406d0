//! Mathematical utilities: growth basis, least squares, ridge and NNLS solvers.

pub mod basis;
pub mod nnls;
pub mod ols;
pub mod ridge;

pub use basis::*;
pub use nnls::*;
pub use ols::*;
pub use ridge::*;
