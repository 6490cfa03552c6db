use super::{FeedEntity, FeedId};

/// a GTFS route. two routes are the same route when their short names are
/// equal, regardless of their identifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: FeedId,
    pub agency: Option<FeedId>,
    /// deduplication key used when merging
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub desc: Option<String>,
    pub route_type: u16,
    pub url: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub sort_order: Option<u32>,
}

impl FeedEntity for Route {
    type Key = FeedId;
    const TABLE: &'static str = "routes";

    fn key(&self) -> FeedId {
        self.id.clone()
    }
}
