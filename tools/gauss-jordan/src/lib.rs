//! Inverts random matrices and reports how accurate and fast the inversion was.

pub mod config;
pub mod run;
