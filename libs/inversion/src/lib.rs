//! Gauss-Jordan matrix inversion with partial pivoting.
//!
//! Two drivers are provided:
//!
//! * [SequentialInverter] owns the whole augmented matrix `[A | I]`. Elimination can optionally be spread over
//!   a rayon thread pool, one row per task.
//! * [DistributedInverter] partitions the rows of the augmented matrix across a group of ranks, row `r` being
//!   owned by rank `r mod P`. Each rank runs its own state machine and only talks to the rest of the group
//!   through messages: a pivot reduction, a broadcast of the winning row, a paired row exchange and a broadcast
//!   of the normalized pivot row.
//!
//! Both drivers select the same pivots and perform the same floating point operations on every row, so they
//! produce bit-identical inverses regardless of the number of threads or ranks used.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

pub mod config;
pub mod distributed;
pub mod elimination;
pub mod errors;
pub mod exchange;
pub mod network;
pub mod ownership;
pub mod pivot;
pub mod sequential;

pub use config::{EliminationMode, InversionConfig, InversionMode};
pub use distributed::DistributedInverter;
pub use errors::InversionError;
pub use sequential::SequentialInverter;

use math_lib::matrix::Matrix;

/// Invert a square matrix using the driver selected in the configuration.
pub fn invert(matrix: &Matrix, config: &InversionConfig) -> Result<Matrix, InversionError> {
    config.validate()?;
    match config.mode {
        InversionMode::Sequential => {
            let inverter = match config.threads {
                Some(threads) => SequentialInverter::with_threads(config.elimination, threads)?,
                None => SequentialInverter::new(config.elimination),
            };
            inverter.invert(matrix)
        }
        InversionMode::Distributed => {
            let mut inverter = DistributedInverter::new(config.process_count)?;
            if let Some(max_rounds) = config.max_rounds {
                inverter = inverter.with_max_rounds(max_rounds);
            }
            inverter.invert(matrix)
        }
    }
}
