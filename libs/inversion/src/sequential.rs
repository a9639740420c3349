//! The single process driver.

use crate::{
    config::EliminationMode,
    elimination::{eliminate_all, normalize},
    errors::InversionError,
    exchange::exchange_rows,
    pivot::{select_pivot, PivotRecord},
};
use math_lib::matrix::Matrix;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use tracing::{debug, trace};

// The steps applied to every column, in order.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    SelectPivot,
    CheckSingular(PivotRecord),
    ExchangeRows(PivotRecord),
    NormalizePivot,
    Eliminate,
    Advance,
    Done,
}

/// Inverts matrices on a single process.
///
/// The inverse is computed by reducing the augmented matrix `[A | I]` to `[I | A^-1]` one column at a time.
/// Row operations only ever touch rows, so the elimination of a column can be spread over threads without
/// changing the result.
pub struct SequentialInverter {
    mode: EliminationMode,
    pool: Option<ThreadPool>,
}

impl SequentialInverter {
    /// Construct a new inverter. Parallel elimination runs on rayon's global thread pool.
    pub fn new(mode: EliminationMode) -> Self {
        Self { mode, pool: None }
    }

    /// Construct a new inverter that runs parallel elimination on a dedicated pool of `threads` threads.
    pub fn with_threads(mode: EliminationMode, threads: NonZeroUsize) -> Result<Self, InversionError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|index| format!("elimination-{index}"))
            .build()
            .map_err(|e| InversionError::Config(format!("failed to build thread pool: {e}")))?;
        Ok(Self { mode, pool: Some(pool) })
    }

    /// The elimination mode in use.
    pub fn mode(&self) -> EliminationMode {
        self.mode
    }

    /// Invert a square matrix.
    pub fn invert(&self, matrix: &Matrix) -> Result<Matrix, InversionError> {
        match &self.pool {
            Some(pool) => pool.install(|| self.run(matrix)),
            None => self.run(matrix),
        }
    }

    fn run(&self, matrix: &Matrix) -> Result<Matrix, InversionError> {
        if !matrix.is_square() {
            return Err(InversionError::DimensionMismatch { rows: matrix.rows(), cols: matrix.cols() });
        }
        let size = matrix.rows();
        debug!("Inverting {size}x{size} matrix using {:?} elimination", self.mode);

        let mut augmented = Matrix::concat_cols(matrix, &Matrix::identity(size)?)?;
        let mut column = 0;
        let mut step = Step::SelectPivot;
        loop {
            trace!(column, ?step, "Running inversion step");
            step = match step {
                Step::SelectPivot => Step::CheckSingular(select_pivot(&augmented, column)?),
                Step::CheckSingular(pivot) => {
                    if pivot.is_zero() {
                        debug!("No usable pivot in column {column}");
                        return Err(InversionError::Singular { column });
                    }
                    Step::ExchangeRows(pivot)
                }
                Step::ExchangeRows(pivot) => {
                    exchange_rows(&mut augmented, pivot.row, column)?;
                    Step::NormalizePivot
                }
                Step::NormalizePivot => {
                    let pivot = augmented.get(column, column)?;
                    normalize(&mut augmented.row_mut(column)?, pivot);
                    Step::Eliminate
                }
                Step::Eliminate => {
                    eliminate_all(&mut augmented, column, self.mode)?;
                    Step::Advance
                }
                Step::Advance => {
                    column += 1;
                    if column == size { Step::Done } else { Step::SelectPivot }
                }
                Step::Done => break,
            };
        }
        Ok(augmented.columns(size..size * 2)?)
    }
}
