//! Inversion parameters.

use crate::errors::InversionError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// The driver used to invert a matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionMode {
    /// A single process owning the whole matrix.
    #[default]
    Sequential,

    /// A group of ranks, each owning a subset of the rows.
    Distributed,
}

/// How the elimination step of the sequential driver is run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationMode {
    /// One row after the other on the calling thread.
    #[default]
    Serial,

    /// Rows are eliminated concurrently on a rayon thread pool.
    Parallel,
}

/// The parameters of an inversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InversionConfig {
    /// The driver to use.
    #[serde(default)]
    pub mode: InversionMode,

    /// The elimination mode for the sequential driver.
    #[serde(default)]
    pub elimination: EliminationMode,

    /// The number of threads used for parallel elimination, rayon's global pool is used if not set.
    #[serde(default)]
    pub threads: Option<NonZeroUsize>,

    /// The number of ranks for the distributed driver.
    #[serde(default = "default_process_count")]
    pub process_count: usize,

    /// The maximum number of message rounds the distributed driver runs before giving up.
    ///
    /// When not set this is derived from the matrix size.
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

fn default_process_count() -> usize {
    1
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            mode: InversionMode::default(),
            elimination: EliminationMode::default(),
            threads: None,
            process_count: default_process_count(),
            max_rounds: None,
        }
    }
}

impl InversionConfig {
    /// Ensure these parameters can be used to run an inversion.
    pub fn validate(&self) -> Result<(), InversionError> {
        if self.process_count == 0 {
            return Err(InversionError::Config("process count must be at least 1".into()));
        }
        if self.max_rounds == Some(0) {
            return Err(InversionError::Config("max rounds must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = InversionConfig::default();
        assert_eq!(config.mode, InversionMode::Sequential);
        assert_eq!(config.elimination, EliminationMode::Serial);
        assert_eq!(config.process_count, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserialize_partial() {
        let config: InversionConfig =
            serde_json::from_str(r#"{"mode": "distributed", "process_count": 4}"#).expect("invalid config");
        assert_eq!(config.mode, InversionMode::Distributed);
        assert_eq!(config.process_count, 4);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn zero_processes() {
        let config = InversionConfig { process_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(InversionError::Config(_))));
    }

    #[test]
    fn zero_rounds() {
        let config = InversionConfig { max_rounds: Some(0), ..Default::default() };
        assert!(matches!(config.validate(), Err(InversionError::Config(_))));
    }

    #[test]
    fn unknown_field() {
        let result = serde_json::from_str::<InversionConfig>(r#"{"processes": 4}"#);
        assert!(result.is_err());
    }
}
