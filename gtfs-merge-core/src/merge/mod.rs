mod admission;
mod discovery;
mod fan_out;
mod merge_config;
mod merge_error;
mod merge_phase;
mod merge_summary;
mod merger;
pub mod phase_ops;
mod rewrite_ops;
pub mod route_novelty;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use admission::Admission;
pub use discovery::{DiscoverySet, IdSet};
pub use fan_out::{FanOut, PhaseTally};
pub use merge_config::MergeConfig;
pub use merge_error::{ElementFailure, MergeError};
pub use merge_phase::MergePhase;
pub use merge_summary::{MergeSummary, PhaseReport};
pub use merger::{merge, GtfsMerger};
pub use rewrite_ops::IdRewriter;
