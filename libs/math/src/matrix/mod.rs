//! Matrix operations.

pub mod matrix;
pub mod ops;
pub mod row;

pub use matrix::{Matrix, MatrixError};
pub use row::RowSliceMut;
