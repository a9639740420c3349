//! Partial pivoting.

use math_lib::matrix::{Matrix, MatrixError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A candidate pivot: a value along with the global index of the row holding it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PivotRecord {
    /// The signed value of the candidate.
    pub value: f64,

    /// The global row index the value lives in.
    pub row: usize,
}

impl PivotRecord {
    /// Construct a new record.
    pub fn new(value: f64, row: usize) -> Self {
        Self { value, row }
    }

    /// The absolute value of this candidate.
    pub fn magnitude(&self) -> f64 {
        self.value.abs()
    }

    /// Whether this candidate can't be used as a pivot.
    ///
    /// Only an exact zero is rejected, tiny values are accepted as is. Entries are expected to be finite: a NaN
    /// is not zero and will propagate through the elimination.
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Whether this candidate wins over another one.
    ///
    /// The larger magnitude wins and ties go to the lowest row index. This makes the selection independent of
    /// the order candidates are looked at in.
    ///
    /// Magnitudes are compared with [f64::total_cmp], so a NaN outranks every number, infinities included.
    pub fn supersedes(&self, other: &PivotRecord) -> bool {
        match self.magnitude().total_cmp(&other.magnitude()) {
            Ordering::Greater => true,
            Ordering::Equal => self.row < other.row,
            Ordering::Less => false,
        }
    }
}

/// Pick the best candidate out of a sequence of `(row, value)` pairs.
///
/// Returns `None` when the sequence is empty.
pub fn best_candidate<I>(candidates: I) -> Option<PivotRecord>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    candidates.into_iter().map(|(row, value)| PivotRecord::new(value, row)).reduce(pick)
}

/// Reduce the candidates proposed by every rank into the global pivot.
///
/// Ranks that own no rows at or below the current column propose nothing.
pub fn reduce_candidates<I>(candidates: I) -> Option<PivotRecord>
where
    I: IntoIterator<Item = Option<PivotRecord>>,
{
    candidates.into_iter().flatten().reduce(pick)
}

/// Select the pivot for a column out of the rows `column..rows` of a matrix.
pub fn select_pivot(matrix: &Matrix, column: usize) -> Result<PivotRecord, MatrixError> {
    let candidates = (column..matrix.rows()).map(|row| Ok((row, matrix.get(row, column)?)));
    let candidates = candidates.collect::<Result<Vec<_>, MatrixError>>()?;
    best_candidate(candidates).ok_or(MatrixError::IndexOutOfRange {
        row: column,
        col: column,
        rows: matrix.rows(),
        cols: matrix.cols(),
    })
}

fn pick(best: PivotRecord, candidate: PivotRecord) -> PivotRecord {
    if candidate.supersedes(&best) { candidate } else { best }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_matrix(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    #[test]
    fn largest_magnitude_wins() {
        let matrix = make_matrix(&[&[1.0, 0.0], &[-3.0, 0.0]]);
        assert_eq!(select_pivot(&matrix, 0).unwrap(), PivotRecord::new(-3.0, 1));
    }

    #[test]
    fn rows_above_column_are_ignored() {
        let matrix = make_matrix(&[&[0.0, 9.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 2.0, 0.0]]);
        assert_eq!(select_pivot(&matrix, 1).unwrap(), PivotRecord::new(2.0, 2));
    }

    #[test]
    fn ties_go_to_lowest_row() {
        let matrix = make_matrix(&[&[2.0, 0.0, 0.0], &[-2.0, 0.0, 0.0], &[2.0, 0.0, 0.0]]);
        assert_eq!(select_pivot(&matrix, 0).unwrap(), PivotRecord::new(2.0, 0));

        // The order the candidates are seen in doesn't matter.
        let reduced = reduce_candidates(vec![
            Some(PivotRecord::new(2.0, 2)),
            None,
            Some(PivotRecord::new(-2.0, 1)),
            Some(PivotRecord::new(1.0, 0)),
        ]);
        assert_eq!(reduced, Some(PivotRecord::new(-2.0, 1)));
    }

    #[test]
    fn zero_column() {
        let matrix = make_matrix(&[&[1.0, 0.0], &[2.0, 0.0]]);
        let pivot = select_pivot(&matrix, 1).unwrap();
        assert!(pivot.is_zero());
        assert_eq!(pivot.row, 1);
    }

    #[test]
    fn tiny_values_are_not_zero() {
        assert!(!PivotRecord::new(1e-300, 0).is_zero());
        assert!(PivotRecord::new(-0.0, 0).is_zero());
    }

    #[test]
    fn nan_selection_is_order_independent() {
        let candidates = [
            Some(PivotRecord::new(3.0, 0)),
            Some(PivotRecord::new(f64::NAN, 2)),
            Some(PivotRecord::new(f64::NEG_INFINITY, 1)),
        ];
        let forward = reduce_candidates(candidates).unwrap();
        let backward = reduce_candidates(candidates.into_iter().rev()).unwrap();
        assert_eq!(forward.row, 2);
        assert_eq!(backward.row, 2);
        assert!(forward.value.is_nan() && !forward.is_zero());
    }

    #[test]
    fn no_candidates() {
        assert_eq!(reduce_candidates(vec![None, None]), None);
        assert_eq!(best_candidate(Vec::new()), None);
        let matrix = Matrix::identity(2).unwrap();
        assert!(select_pivot(&matrix, 2).is_err());
    }
}
