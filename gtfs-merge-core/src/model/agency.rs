use super::{FeedEntity, FeedId};

#[derive(Clone, Debug, PartialEq)]
pub struct Agency {
    pub id: FeedId,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub lang: Option<String>,
    pub phone: Option<String>,
    pub fare_url: Option<String>,
    pub email: Option<String>,
}

impl FeedEntity for Agency {
    type Key = FeedId;
    const TABLE: &'static str = "agency";

    fn key(&self) -> FeedId {
        self.id.clone()
    }
}
