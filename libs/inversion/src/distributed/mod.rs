//! The distributed driver.

pub mod partition;
pub mod state;

use crate::{
    errors::InversionError,
    network::{InitializedRank, RankNetwork, RankOutcome},
    ownership::RowOwnership,
};
use basic_types::Rank;
use math_lib::matrix::Matrix;
use partition::LocalRows;
use state::{InversionState, RankOutput};
use tracing::{debug, info};

/// Inverts matrices by spreading their rows across a group of ranks.
///
/// Each rank only ever sees the rows it owns plus whatever other ranks send it. The matrix is scattered to the
/// ranks, they run to completion on a [RankNetwork] and the rows of the inverse are gathered back in order.
#[derive(Clone, Debug)]
pub struct DistributedInverter {
    ownership: RowOwnership,
    max_rounds: Option<usize>,
}

impl DistributedInverter {
    /// Construct a new inverter for `process_count` ranks.
    pub fn new(process_count: usize) -> Result<Self, InversionError> {
        Ok(Self { ownership: RowOwnership::new(process_count)?, max_rounds: None })
    }

    /// Set the number of rounds after which the ranks are assumed to be stuck.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// The number of ranks used.
    pub fn process_count(&self) -> usize {
        self.ownership.process_count()
    }

    /// The default round limit for a matrix of the given size.
    ///
    /// Every column takes at most 4 rounds: candidates, pivot announcement, row exchange and pivot row.
    pub fn default_max_rounds(size: usize) -> usize {
        size.saturating_mul(4).saturating_add(1)
    }

    /// Invert a square matrix.
    pub fn invert(&self, matrix: &Matrix) -> Result<Matrix, InversionError> {
        if !matrix.is_square() {
            return Err(InversionError::DimensionMismatch { rows: matrix.rows(), cols: matrix.cols() });
        }
        let size = matrix.rows();
        let process_count = self.process_count();
        info!("Inverting {size}x{size} matrix across {process_count} ranks");

        let augmented = Matrix::concat_cols(matrix, &Matrix::identity(size)?)?;
        let mut ranks = Vec::with_capacity(process_count);
        for rank in Rank::all(process_count) {
            let rows = LocalRows::scatter(&augmented, self.ownership, rank)
                .map_err(|e| InversionError::ProtocolDesync(format!("failed to scatter rows: {e}")))?;
            debug!("Rank {rank} owns {} rows", rows.len());
            let (state, initial_messages) = InversionState::new(rank, self.ownership, rows, size)
                .map_err(|e| InversionError::ProtocolDesync(format!("failed to initialize rank {rank}: {e}")))?;
            ranks.push(InitializedRank::new(state, initial_messages));
        }

        let max_rounds = self.max_rounds.unwrap_or_else(|| Self::default_max_rounds(size));
        let outputs = RankNetwork::new(process_count, max_rounds).run(ranks)?;
        Self::gather(outputs, size)
    }

    fn gather(outputs: Vec<RankOutcome<InversionState>>, size: usize) -> Result<Matrix, InversionError> {
        let mut singular_column = None;
        let mut rows: Vec<Option<Vec<f64>>> = vec![None; size];
        for RankOutcome { rank, output } in &outputs {
            match output {
                RankOutput::Singular { column } => {
                    if singular_column.is_some_and(|previous| previous != *column) {
                        return Err(InversionError::ProtocolDesync(format!(
                            "ranks disagree on the singular column, rank {rank} reported {column}"
                        )));
                    }
                    singular_column = Some(*column);
                }
                RankOutput::Inverted { rows: owned } => {
                    for (row, values) in owned {
                        let slot = rows.get_mut(*row).ok_or_else(|| {
                            InversionError::ProtocolDesync(format!("rank {rank} returned unknown row {row}"))
                        })?;
                        if slot.replace(values.clone()).is_some() {
                            return Err(InversionError::ProtocolDesync(format!("row {row} returned twice")));
                        }
                    }
                }
            }
        }

        if let Some(column) = singular_column {
            if rows.iter().any(Option::is_some) {
                return Err(InversionError::ProtocolDesync("ranks disagree on the matrix being singular".into()));
            }
            return Err(InversionError::Singular { column });
        }
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row, values)| {
                values.ok_or_else(|| InversionError::ProtocolDesync(format!("no rank returned row {row}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Matrix::from_rows(rows)?)
    }
}
