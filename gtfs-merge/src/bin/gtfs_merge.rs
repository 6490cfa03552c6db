//! merges the routes of a secondary GTFS feed that are missing from a
//! priority feed into a copy of the priority feed.
use clap::Parser;
use gtfs_merge::app::GtfsMergeApp;

fn main() {
    env_logger::init();
    let args = GtfsMergeApp::parse();
    if let Err(e) = args.op.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
