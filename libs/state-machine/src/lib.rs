//! Message driven state machines.
//!
//! A computation that runs on several ranks in lockstep is modelled as one state machine per rank. Each
//! state machine consumes the messages other ranks send it and emits messages addressed to ranks in return.
//!
//! The main type you want to look at if you're **defining** such a computation is the
//! [StateMachineState][crate::StateMachineState] trait. If instead you are **driving** one, you probably
//! want [StateMachine][crate::StateMachine].

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

pub mod errors;
pub mod sm;
pub mod state;

pub use sm::{StateMachine, StateMachineOutput};
pub use state::{StateMachineState, StateMachineStateExt, StateMachineStateOutput, StateMachineStateResult};
