//! The inversion state machine run by every rank.

use crate::{
    distributed::partition::LocalRows,
    elimination::{eliminate, normalize},
    exchange::ExchangePlan,
    ownership::RowOwnership,
    pivot::{best_candidate, reduce_candidates, PivotRecord},
};
use anyhow::{anyhow, Context};
use basic_types::{Rank, RankJar, RankMessage};
use serde::{Deserialize, Serialize};
use state_machine::{
    errors::StateMachineError,
    state::{Recipient, RecipientMessage, StateMachineMessage},
    StateMachineState, StateMachineStateExt, StateMachineStateOutput, StateMachineStateResult,
};
use std::fmt;
use tracing::debug;

/// Each of the inversion state definitions.
pub mod states {
    use crate::{distributed::partition::LocalRows, ownership::RowOwnership, pivot::PivotRecord};
    use basic_types::{Rank, RankJar};

    /// What a rank carries from one state to the next.
    pub struct RankContext {
        /// Our own rank.
        pub rank: Rank,

        /// The assignment of rows to ranks.
        pub ownership: RowOwnership,

        /// The size of the matrix being inverted.
        pub size: usize,

        /// The rows of the augmented matrix we own.
        pub rows: LocalRows,
    }

    /// We are waiting for every rank's pivot candidate for a column.
    pub struct WaitingPivotCandidates {
        /// The shared rank context.
        pub context: RankContext,

        /// The column being eliminated.
        pub column: usize,

        /// The candidate proposed by each rank. Ranks owning no rows at or below the column propose nothing.
        pub candidates: RankJar<Option<PivotRecord>>,
    }

    /// We are waiting for the rank owning the winning pivot to announce it.
    pub struct WaitingPivotSelection {
        /// The shared rank context.
        pub context: RankContext,

        /// The column being eliminated.
        pub column: usize,

        /// The pivot we selected out of the candidates.
        pub expected: PivotRecord,

        /// The pivot announced by its owner.
        pub selected: Option<PivotRecord>,
    }

    /// We are trading rows with another rank.
    pub struct WaitingExchangedRow {
        /// The shared rank context.
        pub context: RankContext,

        /// The column being eliminated.
        pub column: usize,

        /// The global index of the row we sent away and that will be overwritten.
        pub local_row: usize,

        /// The rank we are trading with.
        pub counterpart: Rank,

        /// The row received from the counterpart.
        pub received: Option<Vec<f64>>,
    }

    /// We are waiting for the normalized pivot row.
    pub struct WaitingPivotRow {
        /// The shared rank context.
        pub context: RankContext,

        /// The column being eliminated.
        pub column: usize,

        /// The normalized pivot row.
        pub pivot_row: Option<Vec<f64>>,
    }
}

use states::RankContext;

/// The state of a rank during a distributed inversion.
///
/// Every column goes through the same states on every rank:
///
/// 1. Every rank proposes the best pivot among the rows it owns and all of them reduce the proposals into the
///    same global pivot.
/// 2. The rank owning the pivot announces it, which lets every rank check that it reduced to the same one.
/// 3. If the pivot row and the row at the current column are owned by different ranks, those two ranks send
///    each other their row. Every other rank skips this state.
/// 4. The rank owning the row at the current column normalizes it and broadcasts it. Every rank then eliminates
///    the column from the rows it owns.
pub enum InversionState {
    /// We are waiting for pivot candidates.
    WaitingPivotCandidates(states::WaitingPivotCandidates),

    /// We are waiting for the pivot announcement.
    WaitingPivotSelection(states::WaitingPivotSelection),

    /// We are waiting for the row we're trading.
    WaitingExchangedRow(states::WaitingExchangedRow),

    /// We are waiting for the pivot row.
    WaitingPivotRow(states::WaitingPivotRow),
}

use InversionState::*;

impl InversionState {
    /// Construct a new state for a rank, along with the messages that kick off the inversion.
    ///
    /// `rows` must hold the rows of the augmented matrix `[A | I]` owned by `rank`, where `A` is `size` x `size`.
    pub fn new(
        rank: Rank,
        ownership: RowOwnership,
        rows: LocalRows,
        size: usize,
    ) -> Result<(Self, Vec<StateMachineMessage<Self>>), StateMachineError> {
        let context = RankContext { rank, ownership, size, rows };
        Self::propose_candidate(context, 0)
    }

    /// The column this rank is currently working on.
    pub fn column(&self) -> usize {
        self.progress().0
    }

    fn progress(&self) -> (usize, Stage) {
        match self {
            WaitingPivotCandidates(state) => (state.column, Stage::PivotCandidates),
            WaitingPivotSelection(state) => (state.column, Stage::PivotSelection),
            WaitingExchangedRow(state) => (state.column, Stage::RowExchange),
            WaitingPivotRow(state) => (state.column, Stage::PivotRow),
        }
    }

    fn propose_candidate(
        context: RankContext,
        column: usize,
    ) -> Result<(Self, Vec<StateMachineMessage<Self>>), StateMachineError> {
        let candidates = context
            .rows
            .rows_from(column)
            .map(|(row, values)| {
                values.get(column).map(|value| (row, *value)).ok_or_else(|| anyhow!("row {row} is too short"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let candidate = best_candidate(candidates);
        let message = context.broadcast(InversionMessage::PivotCandidate { column, candidate });
        let candidates = RankJar::new(context.ownership.process_count());
        let state = states::WaitingPivotCandidates { context, column, candidates };
        Ok((WaitingPivotCandidates(state), vec![message]))
    }

    fn transition_waiting_pivot_candidates(state: states::WaitingPivotCandidates) -> StateMachineStateResult<Self> {
        let states::WaitingPivotCandidates { context, column, candidates } = state;
        let candidates = candidates.into_elements().map(|(_, candidate)| candidate);
        let pivot = reduce_candidates(candidates).ok_or_else(|| anyhow!("no pivot candidates for column {column}"))?;
        if pivot.is_zero() {
            debug!("Rank {} found no usable pivot in column {column}", context.rank);
            return Ok(StateMachineStateOutput::Final(RankOutput::Singular { column }));
        }

        let mut messages = Vec::new();
        if context.ownership.owns(context.rank, pivot.row) {
            // Announce the pivot as we hold it rather than echoing the reduced one.
            let values = context.rows.row(pivot.row).context("reading pivot row")?;
            let value = *values.get(column).ok_or_else(|| anyhow!("pivot row is too short"))?;
            let pivot = PivotRecord::new(value, pivot.row);
            messages.push(context.broadcast(InversionMessage::PivotSelected { column, pivot }));
        }
        let state = states::WaitingPivotSelection { context, column, expected: pivot, selected: None };
        Ok(StateMachineStateOutput::Messages(WaitingPivotSelection(state), messages))
    }

    fn transition_waiting_pivot_selection(state: states::WaitingPivotSelection) -> StateMachineStateResult<Self> {
        let states::WaitingPivotSelection { mut context, column, selected, .. } = state;
        let pivot = selected.ok_or_else(|| anyhow!("pivot for column {column} was not announced"))?;
        let plan = ExchangePlan::new(&context.ownership, pivot.row, column);
        match plan.counterpart(context.rank) {
            Some(counterpart) => {
                let local_row = if context.ownership.owns(context.rank, pivot.row) { pivot.row } else { column };
                let row = context.rows.row(local_row).context("reading exchanged row")?.to_vec();
                let message = InversionMessage::ExchangedRow { column, row };
                let message = RecipientMessage::new(Recipient::Single(counterpart), message);
                let state = states::WaitingExchangedRow { context, column, local_row, counterpart, received: None };
                Ok(StateMachineStateOutput::Messages(WaitingExchangedRow(state), vec![message]))
            }
            None => {
                if plan == (ExchangePlan::Local { owner: context.rank }) {
                    context.rows.swap(pivot.row, column).context("swapping rows")?;
                }
                Self::broadcast_pivot_row(context, column)
            }
        }
    }

    fn transition_waiting_exchanged_row(state: states::WaitingExchangedRow) -> StateMachineStateResult<Self> {
        let states::WaitingExchangedRow { mut context, column, local_row, received, .. } = state;
        let received = received.ok_or_else(|| anyhow!("exchanged row for column {column} was not received"))?;
        context.rows.set_row(local_row, received).context("storing exchanged row")?;
        Self::broadcast_pivot_row(context, column)
    }

    fn broadcast_pivot_row(mut context: RankContext, column: usize) -> StateMachineStateResult<Self> {
        let mut messages = Vec::new();
        if context.ownership.owns(context.rank, column) {
            let mut row = context.rows.row_mut(column).context("reading pivot row")?;
            let pivot = *row.get(column).ok_or_else(|| anyhow!("pivot row is too short"))?;
            normalize(&mut row, pivot);
            let row = row.to_vec();
            messages.push(context.broadcast(InversionMessage::PivotRow { column, row }));
        }
        let state = states::WaitingPivotRow { context, column, pivot_row: None };
        Ok(StateMachineStateOutput::Messages(WaitingPivotRow(state), messages))
    }

    fn transition_waiting_pivot_row(state: states::WaitingPivotRow) -> StateMachineStateResult<Self> {
        let states::WaitingPivotRow { mut context, column, pivot_row } = state;
        let pivot_row = pivot_row.ok_or_else(|| anyhow!("pivot row for column {column} was not received"))?;
        for (row, mut values) in context.rows.iter_mut() {
            if row != column {
                eliminate(&mut values, &pivot_row, column).context("eliminating row")?;
            }
        }

        let next_column = column.checked_add(1).ok_or_else(|| anyhow!("column overflow"))?;
        if next_column == context.size {
            let rows = context.rows.into_trailing_columns(context.size);
            return Ok(StateMachineStateOutput::Final(RankOutput::Inverted { rows }));
        }
        let (state, messages) = Self::propose_candidate(context, next_column)?;
        Ok(StateMachineStateOutput::Messages(state, messages))
    }

    fn handle_rank_message(mut state: Self, message: RankMessage<InversionMessage>) -> StateMachineStateResult<Self> {
        let current = state.progress();
        let received = message.message.progress();
        if received > current {
            return Ok(StateMachineStateOutput::OutOfOrder(state, message));
        }
        let (sender, message) = message.into_parts();
        if received < current {
            return Err(StateMachineError::RejectedMessage(format!(
                "stale {} message from rank {sender} for column {}, currently at column {}",
                message.name(),
                message.column(),
                current.0
            )));
        }

        match (&mut state, message) {
            (WaitingPivotCandidates(state), InversionMessage::PivotCandidate { candidate, .. }) => {
                state
                    .candidates
                    .add_element(sender, candidate)
                    .map_err(|e| StateMachineError::RejectedMessage(format!("pivot candidate: {e}")))?;
            }
            (WaitingPivotSelection(state), InversionMessage::PivotSelected { pivot, .. }) => {
                let holder = state.context.ownership.owner(state.expected.row);
                if sender != holder {
                    return Err(reject(format!("pivot announced by rank {sender} but held by rank {holder}")));
                }
                if state.selected.is_some() {
                    return Err(reject(format!("pivot for column {} announced twice", state.column)));
                }
                // Compare bits so NaN entries don't read as a mismatch.
                if pivot.row != state.expected.row || pivot.value.to_bits() != state.expected.value.to_bits() {
                    return Err(reject(format!("announced pivot {pivot:?} differs from {:?}", state.expected)));
                }
                state.selected = Some(pivot);
            }
            (WaitingExchangedRow(state), InversionMessage::ExchangedRow { row, .. }) => {
                if sender != state.counterpart {
                    return Err(reject(format!("row exchange from rank {sender}, expected rank {}", state.counterpart)));
                }
                check_row_length(&state.context, &row)?;
                if state.received.replace(row).is_some() {
                    return Err(reject(format!("row for column {} exchanged twice", state.column)));
                }
            }
            (WaitingPivotRow(state), InversionMessage::PivotRow { row, .. }) => {
                let owner = state.context.ownership.owner(state.column);
                if sender != owner {
                    return Err(reject(format!("pivot row sent by rank {sender}, owned by rank {owner}")));
                }
                check_row_length(&state.context, &row)?;
                if state.pivot_row.replace(row).is_some() {
                    return Err(reject(format!("pivot row for column {} sent twice", state.column)));
                }
            }
            (_, message) => {
                return Err(reject(format!("unexpected {} message from rank {sender}", message.name())));
            }
        }
        state.advance_if_completed()
    }
}

impl StateMachineState for InversionState {
    type RecipientId = Rank;
    type InputMessage = RankMessage<InversionMessage>;
    type OutputMessage = InversionMessage;
    type FinalResult = RankOutput;

    fn is_completed(&self) -> bool {
        match self {
            WaitingPivotCandidates(state) => state.candidates.is_full(),
            WaitingPivotSelection(state) => state.selected.is_some(),
            WaitingExchangedRow(state) => state.received.is_some(),
            WaitingPivotRow(state) => state.pivot_row.is_some(),
        }
    }

    fn try_next(self) -> StateMachineStateResult<Self> {
        if !self.is_completed() {
            return Err(StateMachineError::StateIsNotCompleted);
        }
        match self {
            WaitingPivotCandidates(state) => Self::transition_waiting_pivot_candidates(state),
            WaitingPivotSelection(state) => Self::transition_waiting_pivot_selection(state),
            WaitingExchangedRow(state) => Self::transition_waiting_exchanged_row(state),
            WaitingPivotRow(state) => Self::transition_waiting_pivot_row(state),
        }
    }

    fn handle_message(self, message: Self::InputMessage) -> StateMachineStateResult<Self> {
        Self::handle_rank_message(self, message)
    }
}

impl fmt::Display for InversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitingPivotCandidates(_) => "WaitingPivotCandidates",
            WaitingPivotSelection(_) => "WaitingPivotSelection",
            WaitingExchangedRow(_) => "WaitingExchangedRow",
            WaitingPivotRow(_) => "WaitingPivotRow",
        };
        write!(f, "InversionState::{name}(column {})", self.column())
    }
}

impl RankContext {
    fn broadcast(&self, message: InversionMessage) -> StateMachineMessage<InversionState> {
        let ranks = Rank::all(self.ownership.process_count());
        RecipientMessage::new(Recipient::Multiple(ranks), message)
    }
}

fn check_row_length(context: &RankContext, row: &[f64]) -> Result<(), StateMachineError> {
    let width = context.rows.width();
    if row.len() != width {
        return Err(reject(format!("row has length {}, expected {width}", row.len())));
    }
    Ok(())
}

fn reject(reason: String) -> StateMachineError {
    StateMachineError::RejectedMessage(reason)
}

// The order in which a column's messages are consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    PivotCandidates,
    PivotSelection,
    RowExchange,
    PivotRow,
}

/// A message exchanged between ranks during an inversion.
///
/// Every message is tagged with the column it belongs to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum InversionMessage {
    /// The sender's best pivot candidate among the rows it owns.
    PivotCandidate {
        /// The column being eliminated.
        column: usize,

        /// The candidate, if the sender owns any rows at or below the column.
        candidate: Option<PivotRecord>,
    },

    /// The winning pivot, announced by the rank owning it.
    PivotSelected {
        /// The column being eliminated.
        column: usize,

        /// The pivot as held by its owner.
        pivot: PivotRecord,
    },

    /// A full row sent to the counterpart rank in a row exchange.
    ExchangedRow {
        /// The column being eliminated.
        column: usize,

        /// The row contents.
        row: Vec<f64>,
    },

    /// The normalized pivot row.
    PivotRow {
        /// The column being eliminated.
        column: usize,

        /// The row contents.
        row: Vec<f64>,
    },
}

impl InversionMessage {
    /// The column this message belongs to.
    pub fn column(&self) -> usize {
        match self {
            Self::PivotCandidate { column, .. }
            | Self::PivotSelected { column, .. }
            | Self::ExchangedRow { column, .. }
            | Self::PivotRow { column, .. } => *column,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::PivotCandidate { .. } => "pivot candidate",
            Self::PivotSelected { .. } => "pivot selection",
            Self::ExchangedRow { .. } => "row exchange",
            Self::PivotRow { .. } => "pivot row",
        }
    }

    fn progress(&self) -> (usize, Stage) {
        let stage = match self {
            Self::PivotCandidate { .. } => Stage::PivotCandidates,
            Self::PivotSelected { .. } => Stage::PivotSelection,
            Self::ExchangedRow { .. } => Stage::RowExchange,
            Self::PivotRow { .. } => Stage::PivotRow,
        };
        (self.column(), stage)
    }
}

/// The output of a rank once the inversion is over.
#[derive(Clone, Debug, PartialEq)]
pub enum RankOutput {
    /// The inversion succeeded.
    Inverted {
        /// The rows of the inverse owned by this rank, along with their global index.
        rows: Vec<(usize, Vec<f64>)>,
    },

    /// The matrix is singular.
    Singular {
        /// The column in which no usable pivot was found.
        column: usize,
    },
}

#[allow(clippy::indexing_slicing)]
#[cfg(test)]
mod test {
    use super::*;
    use math_lib::matrix::Matrix;
    use state_machine::StateMachine;

    fn make_state(
        matrix: &[&[f64]],
        processes: usize,
        rank: usize,
    ) -> (StateMachine<InversionState>, Vec<InversionMessage>) {
        let matrix = Matrix::from_rows(matrix.iter().map(|row| row.to_vec()).collect()).unwrap();
        let size = matrix.rows();
        let augmented = Matrix::concat_cols(&matrix, &Matrix::identity(size).unwrap()).unwrap();
        let ownership = RowOwnership::new(processes).unwrap();
        let rank = Rank::new(rank);
        let rows = LocalRows::scatter(&augmented, ownership, rank).unwrap();
        let (state, messages) = InversionState::new(rank, ownership, rows, size).unwrap();
        (StateMachine::new(state), messages.into_iter().map(RecipientMessage::into_contents).collect())
    }

    fn sent_by(rank: usize, message: InversionMessage) -> RankMessage<InversionMessage> {
        RankMessage::new(Rank::new(rank), message)
    }

    fn candidate(column: usize, value: f64, row: usize) -> InversionMessage {
        InversionMessage::PivotCandidate { column, candidate: Some(PivotRecord::new(value, row)) }
    }

    #[test]
    fn initial_candidate() {
        let (_, messages) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        assert_eq!(messages, vec![candidate(0, 4.0, 0)]);

        // Rank 2 owns nothing in a 2x2 matrix.
        let (_, messages) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 3, 2);
        assert_eq!(messages, vec![InversionMessage::PivotCandidate { column: 0, candidate: None }]);
    }

    #[test]
    fn remote_exchange() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        assert!(sm.handle_message(sent_by(0, candidate(0, 4.0, 0))).unwrap().into_empty().is_ok());

        // Rank 1 holds the pivot so it's the one announcing it.
        let messages = sm.handle_message(sent_by(1, candidate(0, 6.0, 1))).unwrap().into_messages().unwrap();
        assert!(messages.is_empty());

        let pivot = PivotRecord::new(6.0, 1);
        let messages = sm
            .handle_message(sent_by(1, InversionMessage::PivotSelected { column: 0, pivot }))
            .unwrap()
            .into_messages()
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient(), &Recipient::Single(Rank::new(1)));
        let row = vec![4.0, 3.0, 1.0, 0.0];
        assert_eq!(messages[0].contents(), &InversionMessage::ExchangedRow { column: 0, row });

        let row = vec![6.0, 3.0, 0.0, 1.0];
        let messages = sm
            .handle_message(sent_by(1, InversionMessage::ExchangedRow { column: 0, row }))
            .unwrap()
            .into_messages()
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient(), &Recipient::Multiple(Rank::all(2)));
        assert_eq!(
            messages[0].contents(),
            &InversionMessage::PivotRow { column: 0, row: vec![1.0, 0.5, 0.0, 1.0 / 6.0] }
        );
    }

    #[test]
    fn singular_column() {
        let (mut sm, _) = make_state(&[&[0.0, 1.0], &[0.0, 2.0]], 2, 1);
        sm.handle_message(sent_by(0, candidate(0, 0.0, 0))).unwrap();
        let output = sm.handle_message(sent_by(1, candidate(0, 0.0, 1))).unwrap().into_final().unwrap();
        assert_eq!(output, RankOutput::Singular { column: 0 });
    }

    #[test]
    fn single_rank_runs_alone() {
        let (mut sm, mut pending) = make_state(&[&[0.0, 1.0], &[1.0, 0.0]], 1, 0);
        let mut output = None;
        while let Some(message) = pending.pop() {
            match sm.handle_message(sent_by(0, message)).unwrap() {
                state_machine::StateMachineOutput::Messages(messages) => {
                    pending.extend(messages.into_iter().map(RecipientMessage::into_contents))
                }
                state_machine::StateMachineOutput::Final(result) => output = Some(result),
                state_machine::StateMachineOutput::Empty => (),
            }
        }
        let rows = vec![(0, vec![0.0, 1.0]), (1, vec![1.0, 0.0])];
        assert_eq!(output, Some(RankOutput::Inverted { rows }));
    }

    #[test]
    fn future_messages_are_deferred() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 1);
        let row = vec![1.0, 0.5, 0.0, 1.0 / 6.0];
        let output = sm.handle_message(sent_by(0, InversionMessage::PivotRow { column: 0, row })).unwrap();
        assert!(output.into_empty().is_ok());
        assert!(sm.handle_message(sent_by(0, candidate(1, 0.5, 0))).unwrap().into_empty().is_ok());
        assert_eq!(sm.deferred_message_count(), 2);
        assert_eq!(sm.state().unwrap().column(), 0);
    }

    #[test]
    fn stale_message() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        sm.handle_message(sent_by(0, candidate(0, 4.0, 0))).unwrap();
        sm.handle_message(sent_by(1, candidate(0, 6.0, 1))).unwrap();

        let result = sm.handle_message(sent_by(1, candidate(0, 6.0, 1)));
        assert!(matches!(result, Err(StateMachineError::RejectedMessage(_))));
    }

    #[test]
    fn duplicate_candidate() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        sm.handle_message(sent_by(0, candidate(0, 4.0, 0))).unwrap();
        let result = sm.handle_message(sent_by(0, candidate(0, 4.0, 0)));
        assert!(matches!(result, Err(StateMachineError::RejectedMessage(_))));
    }

    #[test]
    fn pivot_announced_by_wrong_rank() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        sm.handle_message(sent_by(0, candidate(0, 4.0, 0))).unwrap();
        sm.handle_message(sent_by(1, candidate(0, 6.0, 1))).unwrap();

        let pivot = PivotRecord::new(6.0, 1);
        let result = sm.handle_message(sent_by(0, InversionMessage::PivotSelected { column: 0, pivot }));
        assert!(matches!(result, Err(StateMachineError::RejectedMessage(_))));
    }

    #[test]
    fn pivot_mismatch() {
        let (mut sm, _) = make_state(&[&[4.0, 3.0], &[6.0, 3.0]], 2, 0);
        sm.handle_message(sent_by(0, candidate(0, 4.0, 0))).unwrap();
        sm.handle_message(sent_by(1, candidate(0, 6.0, 1))).unwrap();

        let pivot = PivotRecord::new(-6.0, 1);
        let result = sm.handle_message(sent_by(1, InversionMessage::PivotSelected { column: 0, pivot }));
        assert!(matches!(result, Err(StateMachineError::RejectedMessage(_))));
    }

    #[test]
    fn short_pivot_row() {
        let (mut sm, _) = make_state(&[&[1.0, 0.0], &[0.0, 1.0]], 2, 1);
        sm.handle_message(sent_by(0, candidate(0, 1.0, 0))).unwrap();
        sm.handle_message(sent_by(1, candidate(0, 0.0, 1))).unwrap();
        let pivot = PivotRecord::new(1.0, 0);
        sm.handle_message(sent_by(0, InversionMessage::PivotSelected { column: 0, pivot })).unwrap();

        let result = sm.handle_message(sent_by(0, InversionMessage::PivotRow { column: 0, row: vec![1.0] }));
        assert!(matches!(result, Err(StateMachineError::RejectedMessage(_))));
    }

    #[test]
    fn message_serialization() {
        let message = candidate(3, -1.5, 7);
        let serialized = serde_json::to_string(&message).unwrap();
        let deserialized: InversionMessage = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, message);
    }
}
