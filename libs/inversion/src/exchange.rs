//! Row exchanges.

use crate::ownership::RowOwnership;
use basic_types::Rank;
use math_lib::matrix::{Matrix, MatrixError};

/// Swap the pivot row into the position of the current column.
///
/// Returns whether a swap actually happened.
pub fn exchange_rows(matrix: &mut Matrix, pivot_row: usize, column: usize) -> Result<bool, MatrixError> {
    if pivot_row == column {
        return Ok(false);
    }
    matrix.swap_rows(pivot_row, column)?;
    Ok(true)
}

/// How a row exchange is carried out when rows are spread across ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangePlan {
    /// The pivot row already sits at the current column.
    None,

    /// Both rows are owned by the same rank, which swaps them locally.
    Local {
        /// The rank owning both rows.
        owner: Rank,
    },

    /// The rows are owned by two different ranks, which send each other their row.
    Remote {
        /// The rank owning the pivot row.
        pivot_owner: Rank,

        /// The rank owning the row at the current column.
        target_owner: Rank,
    },
}

impl ExchangePlan {
    /// Plan the exchange of the pivot row with the row at the current column.
    pub fn new(ownership: &RowOwnership, pivot_row: usize, column: usize) -> Self {
        if pivot_row == column {
            return ExchangePlan::None;
        }
        let pivot_owner = ownership.owner(pivot_row);
        let target_owner = ownership.owner(column);
        if pivot_owner == target_owner {
            ExchangePlan::Local { owner: pivot_owner }
        } else {
            ExchangePlan::Remote { pivot_owner, target_owner }
        }
    }

    /// Whether a rank takes part in this exchange.
    pub fn involves(&self, rank: Rank) -> bool {
        match self {
            ExchangePlan::None => false,
            ExchangePlan::Local { owner } => *owner == rank,
            ExchangePlan::Remote { pivot_owner, target_owner } => *pivot_owner == rank || *target_owner == rank,
        }
    }

    /// The rank a rank has to trade its row with, if any.
    pub fn counterpart(&self, rank: Rank) -> Option<Rank> {
        match self {
            ExchangePlan::Remote { pivot_owner, target_owner } if *pivot_owner == rank => Some(*target_owner),
            ExchangePlan::Remote { pivot_owner, target_owner } if *target_owner == rank => Some(*pivot_owner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn swap_in_place() {
        let mut matrix = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(!exchange_rows(&mut matrix, 0, 0).unwrap());
        assert!(exchange_rows(&mut matrix, 1, 0).unwrap());
        assert_eq!(matrix.row(0).unwrap(), &[3.0, 4.0]);
        assert_eq!(matrix.row(1).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn plans() {
        let ownership = RowOwnership::new(2).unwrap();
        assert_eq!(ExchangePlan::new(&ownership, 3, 3), ExchangePlan::None);
        assert_eq!(ExchangePlan::new(&ownership, 4, 2), ExchangePlan::Local { owner: Rank::new(0) });
        assert_eq!(
            ExchangePlan::new(&ownership, 3, 2),
            ExchangePlan::Remote { pivot_owner: Rank::new(1), target_owner: Rank::new(0) }
        );
    }

    #[test]
    fn participants() {
        let ownership = RowOwnership::new(3).unwrap();
        let plan = ExchangePlan::new(&ownership, 4, 0);
        assert!(plan.involves(Rank::new(0)));
        assert!(plan.involves(Rank::new(1)));
        assert!(!plan.involves(Rank::new(2)));
        assert_eq!(plan.counterpart(Rank::new(0)), Some(Rank::new(1)));
        assert_eq!(plan.counterpart(Rank::new(1)), Some(Rank::new(0)));
        assert_eq!(plan.counterpart(Rank::new(2)), None);

        let local = ExchangePlan::new(&ownership, 3, 0);
        assert!(local.involves(Rank::new(0)));
        assert_eq!(local.counterpart(Rank::new(0)), None);
    }

    #[test]
    fn single_rank_never_trades() {
        let ownership = RowOwnership::new(1).unwrap();
        assert_eq!(ExchangePlan::new(&ownership, 5, 1), ExchangePlan::Local { owner: Rank::new(0) });
    }
}
