//! command line tooling around [`gtfs_merge_core`]: reading GTFS feeds from
//! directories or zip archives, writing the merged feed, and the `gtfs_merge`
//! application.
pub mod app;
pub mod feed;
