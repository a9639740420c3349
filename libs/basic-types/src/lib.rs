//! Basic types shared by every rank taking part in a distributed computation.

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

pub mod jar;
pub mod rank;

pub use jar::{RankJar, RankJarError};
pub use rank::{Rank, RankMessage};
