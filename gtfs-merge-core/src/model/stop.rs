use super::{FeedEntity, FeedId};

#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: FeedId,
    pub code: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zone_id: Option<String>,
    pub url: Option<String>,
    pub location_type: Option<u8>,
    /// rewritten along with the stop, but the parent itself is only copied
    /// when a retained stop time references it
    pub parent_station: Option<FeedId>,
    pub timezone: Option<String>,
    pub wheelchair_boarding: Option<u8>,
    pub platform_code: Option<String>,
}

impl FeedEntity for Stop {
    type Key = FeedId;
    const TABLE: &'static str = "stops";

    fn key(&self) -> FeedId {
        self.id.clone()
    }
}
