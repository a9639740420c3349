//! A state machine's state.

use crate::errors::StateMachineError;
use serde::{de::DeserializeOwned, Serialize};

/// The state of a message driven state machine.
///
/// This trait is meant to be implemented by an enum with one variant per step of a computation. It defines:
///
/// * Whether the current step has everything it needs via [is_completed][StateMachineState::is_completed].
/// * How to move to the next step via [try_next][StateMachineState::try_next].
/// * The messages the computation exchanges and how to handle them via
///   [handle_message][StateMachineState::handle_message].
pub trait StateMachineState
where
    Self: Sized + std::fmt::Display,
{
    /// The type used to address the recipients of output messages, typically a rank.
    type RecipientId;

    /// The input message for this state machine.
    ///
    /// This is usually an enum where every variant feeds a specific state. A state receiving a variant that
    /// belongs to a later state should hand it back as [StateMachineStateOutput::OutOfOrder] so it's replayed
    /// once that state is reached.
    type InputMessage: Serialize + DeserializeOwned + Clone + Send;

    /// The output message this state machine produces.
    ///
    /// Every handled input message may produce 0+ output messages which are delivered to other state machines
    /// running the same computation.
    type OutputMessage: Serialize + DeserializeOwned + Clone + Send;

    /// The final output of this state machine.
    ///
    /// This covers both successful outputs and outputs of a computation that was abandoned, so it will
    /// typically be an enum.
    type FinalResult: Send;

    /// Check if the current state has received everything it needs to transition into the next state.
    fn is_completed(&self) -> bool;

    /// Try to advance the state machine.
    ///
    /// This takes the state by value so its contents can be moved into the next state or into the
    /// [StateMachineState::FinalResult].
    fn try_next(self) -> StateMachineStateResult<Self>;

    /// Handle a message and return an output.
    fn handle_message(self, message: Self::InputMessage) -> StateMachineStateResult<Self>;
}

/// The outputs of handling a message.
///
/// Because [StateMachineState::handle_message] takes the state by value, every variant but
/// [Final][StateMachineStateOutput::Final] hands the state back.
pub enum StateMachineStateOutput<S: StateMachineState> {
    /// The state was updated but no transition happened.
    Empty(S),

    /// A transition happened and produced messages that must be delivered to their recipients. A transition
    /// that has nothing to send still uses this variant with no messages.
    Messages(S, Vec<StateMachineMessage<S>>),

    /// The message belongs to a later state. The message is handed back along with the state.
    OutOfOrder(S, S::InputMessage),

    /// The state machine finished and yielded this output.
    Final(S::FinalResult),
}

/// An alias for what `handle_message` returns to simplify user code.
pub type StateMachineStateResult<S> = Result<StateMachineStateOutput<S>, StateMachineError>;

/// A recipient for a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Recipient<T> {
    /// A single recipient.
    Single(T),

    /// Multiple recipients.
    Multiple(Vec<T>),
}

impl<T> Recipient<T> {
    /// The recipients as a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Recipient::Single(recipient) => vec![recipient],
            Recipient::Multiple(recipients) => recipients,
        }
    }
}

/// An output message along with the recipient it's addressed to.
#[derive(Clone, Debug)]
pub struct RecipientMessage<I, O> {
    recipient: Recipient<I>,
    contents: O,
}

impl<I, O> RecipientMessage<I, O> {
    /// Construct a new state machine message.
    pub fn new(recipient: Recipient<I>, contents: O) -> Self {
        Self { recipient, contents }
    }

    /// The recipient of this message.
    pub fn recipient(&self) -> &Recipient<I> {
        &self.recipient
    }

    /// The contents of this message.
    pub fn contents(&self) -> &O {
        &self.contents
    }

    /// Consumes this message and returns the contents of it.
    pub fn into_contents(self) -> O {
        self.contents
    }

    /// Consumes this message and returns the recipient and contents.
    pub fn into_parts(self) -> (Recipient<I>, O) {
        (self.recipient, self.contents)
    }
}

/// An alias that allows deriving the recipient and output message out of a state machine state.
#[allow(type_alias_bounds)]
pub type StateMachineMessage<S: StateMachineState> = RecipientMessage<S::RecipientId, S::OutputMessage>;

/// Helpers available on every [StateMachineState].
pub trait StateMachineStateExt: StateMachineState {
    /// Transitions the state if it is completed, otherwise hands the state back untouched.
    fn advance_if_completed(self) -> StateMachineStateResult<Self>;
}

impl<T: StateMachineState> StateMachineStateExt for T {
    fn advance_if_completed(self) -> StateMachineStateResult<Self> {
        if self.is_completed() { self.try_next() } else { Ok(StateMachineStateOutput::Empty(self)) }
    }
}

