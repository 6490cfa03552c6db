use super::{FeedEntity, FeedId, SurrogateKey};

#[derive(Clone, Debug, PartialEq)]
pub struct Frequency {
    pub key: SurrogateKey,
    pub trip: FeedId,
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
    pub exact_times: Option<u8>,
}

impl FeedEntity for Frequency {
    type Key = SurrogateKey;
    const TABLE: &'static str = "frequencies";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}
