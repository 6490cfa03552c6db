use super::{FeedEntity, FeedId, SurrogateKey};

#[derive(Clone, Debug, PartialEq)]
pub struct ShapePoint {
    pub key: SurrogateKey,
    pub shape: FeedId,
    pub latitude: f64,
    pub longitude: f64,
    pub sequence: u32,
    pub dist_traveled: Option<f64>,
}

impl FeedEntity for ShapePoint {
    type Key = SurrogateKey;
    const TABLE: &'static str = "shapes";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}
