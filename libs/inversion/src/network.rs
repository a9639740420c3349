//! An in-process network of ranks.
//!
//! Every rank runs its own state machine and the network is nothing more than a router: each round, the messages
//! produced in the previous round are delivered to their recipients and every rank that received something
//! handles its messages. Ranks are run in parallel within a round, which means a rank's progress depends only on
//! the messages it receives and never on how the ranks are scheduled.

use crate::errors::InversionError;
use basic_types::{Rank, RankMessage};
use rayon::prelude::*;
use state_machine::{
    state::{Recipient, StateMachineMessage},
    StateMachine, StateMachineOutput, StateMachineState,
};
use std::time::Instant;
use tracing::{debug, trace};

/// A rank's state along with the messages it emits on startup.
pub struct InitializedRank<S: StateMachineState> {
    /// The initial state.
    pub state: S,

    /// The messages to deliver in the first round.
    pub initial_messages: Vec<StateMachineMessage<S>>,
}

impl<S: StateMachineState> InitializedRank<S> {
    /// Construct a new initialized rank.
    pub fn new(state: S, initial_messages: Vec<StateMachineMessage<S>>) -> Self {
        Self { state, initial_messages }
    }
}

/// The final output of a rank.
pub struct RankOutcome<S: StateMachineState> {
    /// The rank that produced the output.
    pub rank: Rank,

    /// The output itself.
    pub output: S::FinalResult,
}

/// Routes messages between a fixed group of ranks until all of them are done.
#[derive(Clone, Debug)]
pub struct RankNetwork {
    process_count: usize,
    max_rounds: usize,
}

impl RankNetwork {
    /// Construct a new network.
    ///
    /// # Arguments
    /// - `process_count` - The number of ranks in the group.
    /// - `max_rounds` - The maximum number of rounds to run before the ranks are assumed to be stuck.
    pub fn new(process_count: usize, max_rounds: usize) -> Self {
        Self { process_count, max_rounds }
    }

    /// The number of ranks in the group.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Run every rank until completion and return their outputs, sorted by rank.
    ///
    /// The rank of each state is its position in `ranks`.
    pub fn run<S, M>(&self, ranks: Vec<InitializedRank<S>>) -> Result<Vec<RankOutcome<S>>, InversionError>
    where
        S: StateMachineState<RecipientId = Rank, InputMessage = RankMessage<M>, OutputMessage = M> + Send,
        M: Clone + Send,
    {
        if ranks.len() != self.process_count {
            return Err(InversionError::Config(format!(
                "network has {} ranks but {} states were provided",
                self.process_count,
                ranks.len()
            )));
        }
        let mut states = Vec::with_capacity(ranks.len());
        let mut initial_messages = Vec::new();
        for (rank, initialized) in Rank::all(self.process_count).into_iter().zip(ranks) {
            states.push(RankState::new(rank, initialized.state));
            initial_messages.extend(initialized.initial_messages.into_iter().map(|message| (rank, message)));
        }

        let start_time = Instant::now();
        let result = self.run_until_completion(states, initial_messages);
        debug!("Ran {} ranks in {}ms", self.process_count, start_time.elapsed().as_millis());
        result
    }

    fn run_until_completion<S, M>(
        &self,
        mut states: Vec<RankState<S>>,
        mut next_round_messages: Vec<(Rank, StateMachineMessage<S>)>,
    ) -> Result<Vec<RankOutcome<S>>, InversionError>
    where
        S: StateMachineState<RecipientId = Rank, InputMessage = RankMessage<M>, OutputMessage = M> + Send,
        M: Clone + Send,
    {
        let mut outputs = Vec::new();
        for round in 0..self.max_rounds {
            // Take this round's messages so we can collect the next round's messages in `next_round_messages`.
            let round_messages = std::mem::take(&mut next_round_messages);
            if round_messages.is_empty() {
                return Err(InversionError::ProtocolDesync(format!(
                    "started round {round} without any messages, {} ranks pending",
                    states.len().saturating_sub(outputs.len())
                )));
            }
            trace!("Running round {round} using {} messages", round_messages.len());
            for (sender, message) in round_messages {
                let (recipients, message) = message.into_parts();
                match recipients {
                    Recipient::Single(rank) => deliver(&mut states, rank, RankMessage::new(sender, message))?,
                    Recipient::Multiple(ranks) => {
                        for rank in ranks {
                            deliver(&mut states, rank, RankMessage::new(sender, message.clone()))?;
                        }
                    }
                }
            }

            // Apply the messages for every rank in parallel and collect the results.
            let round_results: Vec<_> = states.par_iter_mut().map(RankState::apply_messages).collect();
            for result in round_results {
                match result? {
                    RankRoundOutput::Completed(output) => outputs.push(output),
                    RankRoundOutput::Messages(messages) => next_round_messages.extend(messages),
                }
            }
            if outputs.len() == states.len() {
                debug!("All ranks completed after {} rounds", round.saturating_add(1));
                outputs.sort_by_key(|outcome| outcome.rank);
                return Ok(outputs);
            }
        }
        Err(InversionError::ProtocolDesync(format!(
            "exceeded maximum number of rounds ({}) without completing",
            self.max_rounds
        )))
    }
}

fn deliver<S: StateMachineState>(
    states: &mut [RankState<S>],
    rank: Rank,
    message: S::InputMessage,
) -> Result<(), InversionError> {
    let state = states
        .get_mut(rank.index())
        .ok_or_else(|| InversionError::ProtocolDesync(format!("message addressed to unknown rank {rank}")))?;
    if state.state_machine.is_finished() {
        return Err(InversionError::ProtocolDesync(format!("message addressed to finished rank {rank}")));
    }
    state.input_messages.push(message);
    Ok(())
}

enum RankRoundOutput<S: StateMachineState> {
    Completed(RankOutcome<S>),
    Messages(Vec<(Rank, StateMachineMessage<S>)>),
}

struct RankState<S: StateMachineState> {
    rank: Rank,
    state_machine: StateMachine<S>,
    input_messages: Vec<S::InputMessage>,
}

impl<S: StateMachineState> RankState<S> {
    fn new(rank: Rank, state: S) -> Self {
        Self { rank, state_machine: StateMachine::new(state), input_messages: Vec::new() }
    }

    fn apply_messages(&mut self) -> Result<RankRoundOutput<S>, InversionError> {
        let mut next_round_messages = Vec::new();
        for message in std::mem::take(&mut self.input_messages) {
            match self.state_machine.handle_message(message) {
                Ok(StateMachineOutput::Final(output)) => {
                    return Ok(RankRoundOutput::Completed(RankOutcome { rank: self.rank, output }));
                }
                Ok(StateMachineOutput::Messages(messages)) => {
                    next_round_messages.extend(messages.into_iter().map(|message| (self.rank, message)))
                }
                Ok(StateMachineOutput::Empty) => (),
                Err(e) => {
                    let reason = format!("rank {} failed to handle message: {e}", self.rank);
                    return Err(InversionError::ProtocolDesync(reason));
                }
            }
        }
        Ok(RankRoundOutput::Messages(next_round_messages))
    }
}
