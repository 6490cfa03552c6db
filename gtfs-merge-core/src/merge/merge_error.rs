use super::MergePhase;
use crate::{
    dataset::DatasetError,
    model::{SurrogateKey, SurrogateOffset},
};
use itertools::Itertools;
use std::fmt::Display;

#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("invalid merge configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build merge worker pool: {0}")]
    WorkerPoolError(String),
    #[error("failed to build progress bar: {0}")]
    ProgressBarError(String),
    #[error("priority table '{table}' holds surrogate key {max_key} which is not below the merge offset {offset}")]
    SurrogateOffsetCollision {
        table: &'static str,
        max_key: SurrogateKey,
        offset: SurrogateOffset,
    },
    #[error("surrogate key {key} overflows when offset by {offset}")]
    SurrogateKeyOverflow {
        key: SurrogateKey,
        offset: SurrogateOffset,
    },
    #[error(transparent)]
    DatasetError(#[from] DatasetError),
    #[error("phase '{phase}' failed for {} element(s): {}", .failures.len(), .failures.iter().join("; "))]
    PhaseFailed {
        phase: MergePhase,
        failures: Vec<ElementFailure>,
    },
}

/// a per-element task that returned an error or panicked during a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFailure {
    pub phase: MergePhase,
    /// key of the secondary row being processed
    pub element: String,
    pub message: String,
}

impl Display for ElementFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.phase, self.element, self.message)
    }
}
