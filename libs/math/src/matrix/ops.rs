//! Matrix Operations

use crate::matrix::{Matrix, MatrixError};
use std::ops::Mul;

impl Mul<&Matrix> for &Matrix {
    type Output = Result<Matrix, MatrixError>;

    /// Naive matrix multiplication, A: MxK * B: KxN -> C: MxN, O(KMN).
    fn mul(self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols() != other.rows() {
            return Err(MatrixError::DimensionMismatch { expected: self.cols(), found: other.rows() });
        }
        let mut out = Matrix::zero(self.rows(), other.cols())?;
        for (row, values) in self.rows_iter().enumerate() {
            for col in 0..other.cols() {
                let column = other.col_copy(col)?;
                let dot: f64 = values.iter().zip(&column).map(|(left, right)| left * right).sum();
                out.set(row, col, dot)?;
            }
        }
        Ok(out)
    }
}
