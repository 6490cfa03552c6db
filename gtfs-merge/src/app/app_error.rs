use crate::feed::FeedError;
use gtfs_merge_core::merge::MergeError;

#[derive(thiserror::Error, Debug)]
pub enum MergeAppError {
    #[error("{msg}: {source}")]
    ConfigReadError {
        msg: String,
        source: config::ConfigError,
    },
    #[error(transparent)]
    FeedError(#[from] FeedError),
    #[error(transparent)]
    MergeError(#[from] MergeError),
    #[error("failed to build worker pool: {0}")]
    WorkerPoolError(String),
    #[error("summary of '{input}' failed: {message}")]
    SummaryError { input: String, message: String },
}
