use gtfs_structures::Gtfs;
use std::fmt::Display;

/// entity counts of a GTFS feed as parsed by [`gtfs_structures`], used to
/// check that a written feed loads in an independent reader.
pub struct FeedSummary {
    pub message: String,
    pub agencies: usize,
    pub routes: usize,
    pub trips: usize,
    pub stops: usize,
    pub shapes: usize,
}

impl FeedSummary {
    pub const HEADER: &'static str = "input,message,agencies,routes,trips,stops,shapes";

    pub fn error(msg: String) -> Self {
        Self {
            message: msg,
            agencies: Default::default(),
            routes: Default::default(),
            trips: Default::default(),
            stops: Default::default(),
            shapes: Default::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.message == "success"
    }
}

impl Display for FeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.message, self.agencies, self.routes, self.trips, self.stops, self.shapes
        )
    }
}

/// loads the feed at `input` (a directory, zip archive or URL) and counts
/// its entities. load failures are reported in the summary message.
pub fn summarize(input: &str) -> FeedSummary {
    match Gtfs::new(input) {
        Err(e) => FeedSummary::error(format!("gtfs error: {e}")),
        Ok(gtfs) => FeedSummary {
            message: String::from("success"),
            agencies: gtfs.agencies.len(),
            routes: gtfs.routes.len(),
            trips: gtfs.trips.len(),
            stops: gtfs.stops.len(),
            shapes: gtfs.shapes.len(),
        },
    }
}
