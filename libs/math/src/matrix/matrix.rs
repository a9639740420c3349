//! Matrix.

use crate::matrix::RowSliceMut;
use rand::Rng;
use std::{fmt, ops::Range};
use thiserror::Error;

/// A dense matrix of real numbers, stored row by row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMatrix"))]
pub struct Matrix {
    /// The entries, row-major.
    data: Vec<f64>,

    /// Number of rows.
    rows: usize,

    /// Number of columns.
    cols: usize,
}

// Deserialized fields, checked by `Matrix::new` before they become a matrix.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMatrix> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        Matrix::new(raw.data, raw.rows, raw.cols)
    }
}

impl Matrix {
    /// New matrix out of row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Result<Matrix, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::Empty);
        }
        let n = rows.checked_mul(cols).ok_or(MatrixError::Arithmetic)?;
        if n != data.len() {
            return Err(MatrixError::Build(data.len(), n));
        }
        Ok(Matrix { data, rows, cols })
    }

    /// New matrix out of a list of rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix, MatrixError> {
        let row_count = rows.len();
        let cols = rows.first().map(Vec::len).unwrap_or_default();
        let mut data = Vec::with_capacity(row_count.saturating_mul(cols));
        for row in rows {
            if row.len() != cols {
                return Err(MatrixError::Build(row.len(), cols));
            }
            data.extend(row);
        }
        Matrix::new(data, row_count, cols)
    }

    /// Zero matrix.
    pub fn zero(rows: usize, cols: usize) -> Result<Matrix, MatrixError> {
        let n = rows.checked_mul(cols).ok_or(MatrixError::Arithmetic)?;
        Matrix::new(vec![0.0; n], rows, cols)
    }

    /// Identity matrix.
    pub fn identity(n: usize) -> Result<Matrix, MatrixError> {
        let mut m = Matrix::zero(n, n)?;
        for i in 0..n {
            m.set(i, i, 1.0)?;
        }
        Ok(m)
    }

    /// A matrix with entries drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix, MatrixError> {
        let n = rows.checked_mul(cols).ok_or(MatrixError::Arithmetic)?;
        let data = (0..n).map(|_| rng.gen::<f64>()).collect();
        Matrix::new(data, rows, cols)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether this matrix has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns the reference to data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the data as a mutable slice, row-major.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Returns the data as a Vec consuming the matrix.
    pub fn to_vec(self) -> Vec<f64> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize, MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfRange { row, col, rows: self.rows, cols: self.cols });
        }
        row.checked_mul(self.cols).and_then(|start| start.checked_add(col)).ok_or(MatrixError::Arithmetic)
    }

    fn row_range(&self, row: usize) -> Result<Range<usize>, MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::IndexOutOfRange { row, col: 0, rows: self.rows, cols: self.cols });
        }
        let start = row.checked_mul(self.cols).ok_or(MatrixError::Arithmetic)?;
        let end = start.checked_add(self.cols).ok_or(MatrixError::Arithmetic)?;
        Ok(start..end)
    }

    /// Get the matrix entry `M[row,col]`.
    pub fn get(&self, row: usize, col: usize) -> Result<f64, MatrixError> {
        let index = self.offset(row, col)?;
        self.data.get(index).copied().ok_or(MatrixError::Arithmetic)
    }

    /// Set the matrix entry `M[row,col]`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        *self.entry_mut(row, col)? = value;
        Ok(())
    }

    /// Get a mutable reference to the matrix entry `M[row,col]`.
    pub fn entry_mut(&mut self, row: usize, col: usize) -> Result<&mut f64, MatrixError> {
        let index = self.offset(row, col)?;
        self.data.get_mut(index).ok_or(MatrixError::Arithmetic)
    }

    /// A view over a row.
    pub fn row(&self, row: usize) -> Result<&[f64], MatrixError> {
        let range = self.row_range(row)?;
        self.data.get(range).ok_or(MatrixError::Arithmetic)
    }

    /// A mutable view over a row, supporting in place arithmetic.
    pub fn row_mut(&mut self, row: usize) -> Result<RowSliceMut<'_>, MatrixError> {
        let range = self.row_range(row)?;
        self.data.get_mut(range).map(RowSliceMut::new).ok_or(MatrixError::Arithmetic)
    }

    /// An independent copy of a row.
    pub fn row_copy(&self, row: usize) -> Result<Vec<f64>, MatrixError> {
        self.row(row).map(<[f64]>::to_vec)
    }

    /// An independent copy of a column.
    pub fn col_copy(&self, col: usize) -> Result<Vec<f64>, MatrixError> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Iterate over the rows of this matrix.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Exchange the contents of two rows. Swapping a row with itself is a no-op.
    pub fn swap_rows(&mut self, first: usize, second: usize) -> Result<(), MatrixError> {
        let first_range = self.row_range(first)?;
        let second_range = self.row_range(second)?;
        if first == second {
            return Ok(());
        }
        let (low, high) =
            if first < second { (first_range, second_range) } else { (second_range, first_range) };
        let (head, tail) = self.data.split_at_mut(high.start);
        let low_row = head.get_mut(low).ok_or(MatrixError::Arithmetic)?;
        let high_row = tail.get_mut(..self.cols).ok_or(MatrixError::Arithmetic)?;
        low_row.swap_with_slice(high_row);
        Ok(())
    }

    /// Overwrite a row with the given contents.
    pub fn set_row(&mut self, row: usize, contents: &[f64]) -> Result<(), MatrixError> {
        if contents.len() != self.cols {
            return Err(MatrixError::DimensionMismatch { expected: self.cols, found: contents.len() });
        }
        let range = self.row_range(row)?;
        let target = self.data.get_mut(range).ok_or(MatrixError::Arithmetic)?;
        target.copy_from_slice(contents);
        Ok(())
    }

    /// Concatenate two matrices horizontally, producing `[left | right]`.
    pub fn concat_cols(left: &Matrix, right: &Matrix) -> Result<Matrix, MatrixError> {
        if left.rows != right.rows {
            return Err(MatrixError::DimensionMismatch { expected: left.rows, found: right.rows });
        }
        let cols = left.cols.checked_add(right.cols).ok_or(MatrixError::Arithmetic)?;
        let mut data = Vec::with_capacity(left.rows.saturating_mul(cols));
        for (left_row, right_row) in left.rows_iter().zip(right.rows_iter()) {
            data.extend_from_slice(left_row);
            data.extend_from_slice(right_row);
        }
        Matrix::new(data, left.rows, cols)
    }

    /// Extract a block of columns as a new matrix.
    pub fn columns(&self, range: Range<usize>) -> Result<Matrix, MatrixError> {
        if range.end > self.cols || range.is_empty() {
            return Err(MatrixError::IndexOutOfRange {
                row: 0,
                col: range.end,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cols = range.len();
        let mut data = Vec::with_capacity(self.rows.saturating_mul(cols));
        for row in self.rows_iter() {
            data.extend_from_slice(row.get(range.clone()).ok_or(MatrixError::Arithmetic)?);
        }
        Matrix::new(data, self.rows, cols)
    }

    /// The largest absolute difference between this matrix and the identity.
    ///
    /// This is the residual used to check `A * inv(A)` against `I`.
    pub fn max_abs_deviation_from_identity(&self) -> Result<f64, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::DimensionMismatch { expected: self.rows, found: self.cols });
        }
        let mut deviation: f64 = 0.0;
        for (row, values) in self.rows_iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                let expected = if row == col { 1.0 } else { 0.0 };
                deviation = deviation.max((value - expected).abs());
            }
        }
        Ok(deviation)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows_iter() {
            let values: Vec<String> = row.iter().map(|value| format!("{value:>10.4}")).collect();
            writeln!(f, "{}", values.join(" "))?;
        }
        Ok(())
    }
}

/// Matrix Error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// Index outside of the matrix.
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    IndexOutOfRange {
        /// The requested row.
        row: usize,

        /// The requested column.
        col: usize,

        /// The number of rows in the matrix.
        rows: usize,

        /// The number of columns in the matrix.
        cols: usize,
    },

    /// Operands have incompatible shapes.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The dimension the operation required.
        expected: usize,

        /// The dimension that was provided.
        found: usize,
    },

    /// Integer overflow or underflow.
    #[error("integer overflow/underflow")]
    Arithmetic,

    /// Error building matrix.
    #[error("error building matrix, given data has {0} entries which does not match the expected {1}")]
    Build(usize, usize),

    /// A matrix needs at least one row and one column.
    #[error("matrix must have at least one row and one column")]
    Empty,
}
