//! Inversion errors.

use math_lib::matrix::MatrixError;
use thiserror::Error;

/// An error during a matrix inversion.
///
/// None of these are retried: the inversion is abandoned and no partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InversionError {
    /// Only square matrices can be inverted.
    #[error("matrix is not square: {rows}x{cols}")]
    DimensionMismatch {
        /// The number of rows in the input.
        rows: usize,

        /// The number of columns in the input.
        cols: usize,
    },

    /// Every candidate pivot in a column is exactly zero.
    #[error("matrix not invertible: no non-zero pivot in column {column}")]
    Singular {
        /// The column in which the pivot search failed.
        column: usize,
    },

    /// A rank did not follow the distributed protocol.
    #[error("protocol desync: {0}")]
    ProtocolDesync(String),

    /// A matrix operation failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// The inversion was configured with invalid parameters.
    #[error("invalid configuration: {0}")]
    Config(String),
}
