use super::GtfsMergeOperation;
use clap::Parser;

/// command line tool for merging the routes of a secondary GTFS feed that a
/// priority feed lacks into a copy of the priority feed
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct GtfsMergeApp {
    #[command(subcommand)]
    pub op: GtfsMergeOperation,
}
