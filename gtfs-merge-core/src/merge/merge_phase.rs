use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the sequential stages of a merge, in execution order. each phase reads
/// identifier sets produced by the phases before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePhase {
    Agencies,
    Routes,
    Trips,
    StopTimes,
    Stops,
    ShapePoints,
    Calendars,
    Frequencies,
    FareRules,
}

impl MergePhase {
    pub const ALL: [MergePhase; 9] = [
        MergePhase::Agencies,
        MergePhase::Routes,
        MergePhase::Trips,
        MergePhase::StopTimes,
        MergePhase::Stops,
        MergePhase::ShapePoints,
        MergePhase::Calendars,
        MergePhase::Frequencies,
        MergePhase::FareRules,
    ];

    /// phases over typically large tables fan out to the worker pool, the
    /// rest run on the calling thread.
    pub fn is_parallel(&self) -> bool {
        matches!(
            self,
            MergePhase::Trips | MergePhase::StopTimes | MergePhase::Stops | MergePhase::ShapePoints
        )
    }
}

impl Display for MergePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MergePhase::Agencies => "agencies",
            MergePhase::Routes => "routes",
            MergePhase::Trips => "trips",
            MergePhase::StopTimes => "stop_times",
            MergePhase::Stops => "stops",
            MergePhase::ShapePoints => "shape_points",
            MergePhase::Calendars => "calendars",
            MergePhase::Frequencies => "frequencies",
            MergePhase::FareRules => "fare_rules",
        };
        write!(f, "{name}")
    }
}
