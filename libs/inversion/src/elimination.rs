//! Normalization and elimination.
//!
//! Every row is updated as `row[j] = row[j] - pivot_row[j] * row[column]` so the result doesn't depend on how
//! the rows are spread across threads or ranks.

use crate::config::EliminationMode;
use math_lib::matrix::{Matrix, MatrixError, RowSliceMut};
use rayon::prelude::*;

/// Divide the pivot row by its pivot so the pivot becomes 1.
pub fn normalize(row: &mut RowSliceMut<'_>, pivot: f64) {
    row.divide(pivot);
}

/// Zero out `column` in a row by subtracting a multiple of the normalized pivot row.
pub fn eliminate(row: &mut RowSliceMut<'_>, pivot_row: &[f64], column: usize) -> Result<(), MatrixError> {
    let factor = *row
        .get(column)
        .ok_or(MatrixError::DimensionMismatch { expected: column.saturating_add(1), found: row.len() })?;
    row.sub_scaled(pivot_row, factor)
}

/// Eliminate `column` from every row of a matrix except the pivot row itself.
///
/// The row at `column` must already hold the normalized pivot row.
pub fn eliminate_all(matrix: &mut Matrix, column: usize, mode: EliminationMode) -> Result<(), MatrixError> {
    let pivot_row = matrix.row_copy(column)?;
    let width = matrix.cols();
    let data = matrix.as_mut_slice();
    match mode {
        EliminationMode::Serial => data
            .chunks_exact_mut(width)
            .enumerate()
            .filter(|(row, _)| *row != column)
            .try_for_each(|(_, values)| eliminate(&mut RowSliceMut::new(values), &pivot_row, column)),
        EliminationMode::Parallel => data
            .par_chunks_exact_mut(width)
            .enumerate()
            .filter(|(row, _)| *row != column)
            .try_for_each(|(_, values)| eliminate(&mut RowSliceMut::new(values), &pivot_row, column)),
    }
}
