use super::{FeedEntity, FeedId, SurrogateKey};

/// a row of stop_times.txt. the arrival and departure values are kept in
/// their GTFS `HH:MM:SS` form since they may exceed 24 hours.
#[derive(Clone, Debug, PartialEq)]
pub struct StopTime {
    pub key: SurrogateKey,
    pub trip: FeedId,
    pub stop: FeedId,
    pub stop_sequence: u32,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_headsign: Option<String>,
    pub pickup_type: Option<u8>,
    pub drop_off_type: Option<u8>,
    pub shape_dist_traveled: Option<f64>,
    pub timepoint: Option<u8>,
}

impl FeedEntity for StopTime {
    type Key = SurrogateKey;
    const TABLE: &'static str = "stop_times";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}
