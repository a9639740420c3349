//! Errors that occur while a state machine handles messages.

use anyhow::anyhow;
use thiserror::Error;

/// Errors that occur during the execution of a state machine.
#[derive(Error, Debug)]
pub enum StateMachineError {
    /// A transition was requested while the current state is still waiting for messages.
    #[error("state is not completed")]
    StateIsNotCompleted,

    /// A message was rejected by the state that received it.
    #[error("message rejected: {0}")]
    RejectedMessage(String),

    /// This error occurs when any unexpected error is caught
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<InvalidStateError> for StateMachineError {
    fn from(_: InvalidStateError) -> Self {
        StateMachineError::UnexpectedError(anyhow!("invalid state has been reached"))
    }
}

impl From<StateUnavailableError> for StateMachineError {
    fn from(error: StateUnavailableError) -> Self {
        StateMachineError::UnexpectedError(anyhow!("{}", error))
    }
}

/// Error used when an operation is attempted on the wrong state.
#[derive(Debug, Error)]
#[error("invalid state")]
pub struct InvalidStateError;

/// A state machine's state is unavailable.
///
/// This happens when a previous transition failed half way, leaving no state behind, or when the state
/// machine already produced its final output.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("state unavailable: {0}")]
pub struct StateUnavailableError(pub &'static str);
