use super::{FeedEntity, FeedId, SurrogateKey};

/// a row of fare_attributes.txt
#[derive(Clone, Debug, PartialEq)]
pub struct Fare {
    pub id: FeedId,
    pub price: String,
    pub currency_type: String,
    pub payment_method: u8,
    pub transfers: Option<u8>,
    pub agency: Option<FeedId>,
    pub transfer_duration: Option<u32>,
}

impl FeedEntity for Fare {
    type Key = FeedId;
    const TABLE: &'static str = "fare_attributes";

    fn key(&self) -> FeedId {
        self.id.clone()
    }
}

/// a row of fare_rules.txt. zone columns are carried through as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct FareRule {
    pub key: SurrogateKey,
    pub fare: FeedId,
    pub route: Option<FeedId>,
    pub origin_id: Option<String>,
    pub destination_id: Option<String>,
    pub contains_id: Option<String>,
}

impl FeedEntity for FareRule {
    type Key = SurrogateKey;
    const TABLE: &'static str = "fare_rules";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}
