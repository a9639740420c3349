//! Driving a [StateMachineState] one message at a time.

use crate::{
    errors::{InvalidStateError, StateMachineError, StateUnavailableError},
    state::{RecipientMessage, StateMachineMessage, StateMachineState, StateMachineStateOutput},
};
use std::fmt::Formatter;

enum Phase<S> {
    Running(S),
    Failed,
    Finished,
}

impl<S> Phase<S> {
    fn unavailable(&self) -> StateUnavailableError {
        match self {
            Self::Failed => StateUnavailableError("a previous message failed"),
            Self::Finished => StateUnavailableError("state machine reached terminal state"),
            Self::Running(_) => StateUnavailableError("state is running"),
        }
    }
}

// What a single message did to the state.
enum Step<S: StateMachineState> {
    Stored,
    Transitioned(Vec<StateMachineMessage<S>>),
    Finished(S::FinalResult),
}

/// A running state machine.
///
/// Owns the current [StateMachineState] and feeds it messages. Messages that belong to a later state are kept
/// aside and fed again every time the state transitions.
pub struct StateMachine<S: StateMachineState> {
    phase: Phase<S>,
    deferred: Vec<S::InputMessage>,
}

impl<S: StateMachineState> StateMachine<S> {
    /// Create a new state machine.
    pub fn new(initial_state: S) -> Self {
        Self { phase: Phase::Running(initial_state), deferred: Vec::new() }
    }

    /// The current state, unless the machine finished or failed.
    pub fn state(&self) -> Result<&S, StateUnavailableError> {
        match &self.phase {
            Phase::Running(state) => Ok(state),
            phase => Err(phase.unavailable()),
        }
    }

    /// Whether the final output was already produced.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// The number of messages waiting for a later state.
    pub fn deferred_message_count(&self) -> usize {
        self.deferred.len()
    }

    /// Feed a message to the current state.
    ///
    /// When the message causes a transition, the deferred messages are fed again until none of them causes
    /// another one. The messages produced by every transition along the way are returned together.
    pub fn handle_message(&mut self, message: S::InputMessage) -> Result<HandleOutput<S>, StateMachineError> {
        let mut outgoing = match self.step(message)? {
            Step::Stored => return Ok(StateMachineOutput::Empty),
            Step::Finished(output) => return Ok(StateMachineOutput::Final(output)),
            Step::Transitioned(messages) => messages,
        };
        loop {
            let pending = std::mem::take(&mut self.deferred);
            if pending.is_empty() {
                break;
            }
            let mut transitioned = false;
            for message in pending {
                match self.step(message)? {
                    Step::Stored => (),
                    Step::Transitioned(messages) => {
                        outgoing.extend(messages);
                        transitioned = true;
                    }
                    Step::Finished(output) => return Ok(StateMachineOutput::Final(output)),
                }
            }
            if !transitioned {
                break;
            }
        }
        Ok(StateMachineOutput::Messages(outgoing))
    }

    fn step(&mut self, message: S::InputMessage) -> Result<Step<S>, StateMachineError> {
        let state = match std::mem::replace(&mut self.phase, Phase::Failed) {
            Phase::Running(state) => state,
            phase => {
                let error = phase.unavailable();
                self.phase = phase;
                return Err(error.into());
            }
        };

        #[cfg(feature = "log-transitions")]
        let before = state.to_string();

        let step = match state.handle_message(message)? {
            StateMachineStateOutput::Empty(state) => {
                self.phase = Phase::Running(state);
                Step::Stored
            }
            StateMachineStateOutput::OutOfOrder(state, message) => {
                self.phase = Phase::Running(state);
                self.deferred.push(message);
                Step::Stored
            }
            StateMachineStateOutput::Messages(state, messages) => {
                self.phase = Phase::Running(state);
                Step::Transitioned(messages)
            }
            StateMachineStateOutput::Final(output) => {
                self.phase = Phase::Finished;
                self.deferred.clear();
                Step::Finished(output)
            }
        };

        #[cfg(feature = "log-transitions")]
        {
            let after = self.to_string();
            if before != after {
                tracing::debug!("State transition: {before} -> {after}");
            }
        }
        Ok(step)
    }
}

impl<S: StateMachineState> std::fmt::Display for StateMachine<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.phase {
            Phase::Running(state) => write!(f, "{state}"),
            Phase::Failed => write!(f, "Failed"),
            Phase::Finished => write!(f, "Finished"),
        }
    }
}

/// The output of [StateMachine::handle_message].
#[derive(Debug)]
pub enum StateMachineOutput<R, O, F> {
    /// Messages that need to be delivered to other state machines.
    Messages(Vec<RecipientMessage<R, O>>),

    /// The final output of a state machine.
    Final(F),

    /// No output was produced.
    Empty,
}

impl<R, O, F> StateMachineOutput<R, O, F> {
    /// Convert into a final output, error otherwise.
    pub fn into_final(self) -> Result<F, InvalidStateError> {
        match self {
            Self::Final(output) => Ok(output),
            _ => Err(InvalidStateError),
        }
    }

    /// Convert into output messages, error otherwise.
    pub fn into_messages(self) -> Result<Vec<RecipientMessage<R, O>>, InvalidStateError> {
        match self {
            Self::Messages(messages) => Ok(messages),
            _ => Err(InvalidStateError),
        }
    }

    /// Convert into an empty output, error otherwise.
    pub fn into_empty(self) -> Result<(), InvalidStateError> {
        match self {
            Self::Empty => Ok(()),
            _ => Err(InvalidStateError),
        }
    }
}

/// [StateMachineOutput] for the types of a [StateMachineState].
#[allow(type_alias_bounds)]
pub type HandleOutput<S: StateMachineState> = StateMachineOutput<S::RecipientId, S::OutputMessage, S::FinalResult>;
