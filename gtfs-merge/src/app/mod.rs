mod app_error;
mod gtfs_merge_app;
mod merge_app_config;
mod operation;

pub use app_error::MergeAppError;
pub use gtfs_merge_app::GtfsMergeApp;
pub use merge_app_config::{load_merge_config, MergeOverrides};
pub use operation::GtfsMergeOperation;
