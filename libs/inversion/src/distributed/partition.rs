//! The rows held by a single rank.

use crate::ownership::RowOwnership;
use basic_types::Rank;
use math_lib::matrix::{Matrix, MatrixError, RowSliceMut};
use thiserror::Error;

/// An error when accessing a rank's rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartitionError {
    /// The row is owned by another rank.
    #[error("rank {rank} does not own row {row}")]
    NotOwned {
        /// The rank being accessed.
        rank: Rank,

        /// The row that was requested.
        row: usize,
    },

    /// A row was replaced with contents of the wrong length.
    #[error("row has length {found}, expected {expected}")]
    RowLength {
        /// The width of the rows.
        expected: usize,

        /// The length of the provided row.
        found: usize,
    },

    /// The matrix could not be read.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// The subset of the rows of an augmented matrix owned by one rank.
///
/// Rows are addressed by their global index and kept in ascending order.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalRows {
    rank: Rank,
    ownership: RowOwnership,
    width: usize,
    rows: Vec<Vec<f64>>,
}

impl LocalRows {
    /// Copy the rows of `matrix` owned by `rank`.
    pub fn scatter(matrix: &Matrix, ownership: RowOwnership, rank: Rank) -> Result<Self, PartitionError> {
        let rows = ownership
            .owned_rows(rank, matrix.rows())
            .map(|row| matrix.row_copy(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rank, ownership, width: matrix.cols(), rows })
    }

    /// The length of every row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are held, which happens when there are more ranks than rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A row, by global index.
    pub fn row(&self, row: usize) -> Result<&[f64], PartitionError> {
        let index = self.index(row)?;
        self.rows.get(index).map(Vec::as_slice).ok_or(PartitionError::NotOwned { rank: self.rank, row })
    }

    /// A mutable view over a row, by global index.
    pub fn row_mut(&mut self, row: usize) -> Result<RowSliceMut<'_>, PartitionError> {
        let index = self.index(row)?;
        let rank = self.rank;
        self.rows.get_mut(index).map(|values| RowSliceMut::new(values)).ok_or(PartitionError::NotOwned { rank, row })
    }

    /// Replace the contents of a row.
    pub fn set_row(&mut self, row: usize, contents: Vec<f64>) -> Result<(), PartitionError> {
        if contents.len() != self.width {
            return Err(PartitionError::RowLength { expected: self.width, found: contents.len() });
        }
        let index = self.index(row)?;
        let rank = self.rank;
        let target = self.rows.get_mut(index).ok_or(PartitionError::NotOwned { rank, row })?;
        *target = contents;
        Ok(())
    }

    /// Swap two rows, both of which must be held here.
    pub fn swap(&mut self, first: usize, second: usize) -> Result<(), PartitionError> {
        let (first, second) = (self.index(first)?, self.index(second)?);
        if first.max(second) >= self.rows.len() {
            return Err(PartitionError::NotOwned { rank: self.rank, row: first.max(second) });
        }
        self.rows.swap(first, second);
        Ok(())
    }

    /// The held rows at or below `from` along with their global index.
    pub fn rows_from(&self, from: usize) -> impl Iterator<Item = (usize, &[f64])> {
        self.iter().filter(move |(row, _)| *row >= from)
    }

    /// The held rows along with their global index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> {
        self.ownership.owned_rows(self.rank, usize::MAX).zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Mutable views over the held rows along with their global index.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, RowSliceMut<'_>)> {
        self.ownership.owned_rows(self.rank, usize::MAX).zip(self.rows.iter_mut().map(|row| RowSliceMut::new(row)))
    }

    /// Consume these rows and keep the columns starting at `from`, along with each row's global index.
    pub fn into_trailing_columns(self, from: usize) -> Vec<(usize, Vec<f64>)> {
        let global_rows = self.ownership.owned_rows(self.rank, usize::MAX);
        global_rows.zip(self.rows).map(|(row, values)| (row, values.into_iter().skip(from).collect())).collect()
    }

    fn index(&self, row: usize) -> Result<usize, PartitionError> {
        if !self.ownership.owns(self.rank, row) {
            return Err(PartitionError::NotOwned { rank: self.rank, row });
        }
        Ok(self.ownership.local_index(row))
    }
}
