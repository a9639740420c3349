//! Cyclic row ownership.

use crate::errors::InversionError;
use basic_types::Rank;

/// Assigns the rows of a matrix to a group of ranks in round robin fashion.
///
/// Row `r` is owned by rank `r mod P`, so every rank owns either `floor(n / P)` or `ceil(n / P)` rows of an
/// `n` row matrix. Ranks with an index greater than or equal to `n` own nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowOwnership {
    process_count: usize,
}

impl RowOwnership {
    /// Construct a new ownership for a group of `process_count` ranks.
    pub fn new(process_count: usize) -> Result<Self, InversionError> {
        if process_count == 0 {
            return Err(InversionError::Config("process count must be at least 1".into()));
        }
        Ok(Self { process_count })
    }

    /// The number of ranks in the group.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// The rank that owns a row.
    pub fn owner(&self, row: usize) -> Rank {
        Rank::new(row % self.process_count)
    }

    /// Whether a rank owns a row.
    pub fn owns(&self, rank: Rank, row: usize) -> bool {
        self.owner(row) == rank
    }

    /// The position of a row within its owner's local storage.
    pub fn local_index(&self, row: usize) -> usize {
        row / self.process_count
    }

    /// The rows owned by a rank out of `row_count` rows, in ascending order.
    pub fn owned_rows(&self, rank: Rank, row_count: usize) -> impl Iterator<Item = usize> {
        (rank.index()..row_count).step_by(self.process_count)
    }

    /// The number of rows owned by a rank out of `row_count` rows.
    pub fn owned_row_count(&self, rank: Rank, row_count: usize) -> usize {
        self.owned_rows(rank, row_count).count()
    }
}
