use super::{FeedEntity, FeedId};

#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub id: FeedId,
    pub route: FeedId,
    pub service: FeedId,
    pub shape: Option<FeedId>,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub direction_id: Option<u8>,
    pub block_id: Option<String>,
    pub wheelchair_accessible: Option<u8>,
    pub bikes_allowed: Option<u8>,
}

impl FeedEntity for Trip {
    type Key = FeedId;
    const TABLE: &'static str = "trips";

    fn key(&self) -> FeedId {
        self.id.clone()
    }
}
