mod agency;
mod calendar;
mod fare;
mod feed_entity;
mod feed_id;
mod frequency;
mod route;
mod shape_point;
mod stop;
mod stop_time;
mod surrogate_key;
mod trip;

pub use agency::Agency;
pub use calendar::{Calendar, CalendarDate, ServiceException};
pub use fare::{Fare, FareRule};
pub use feed_entity::FeedEntity;
pub use feed_id::{EntityId, FeedId, IdMarker, DEFAULT_ID_MARKER};
pub use frequency::Frequency;
pub use route::Route;
pub use shape_point::ShapePoint;
pub use stop::Stop;
pub use stop_time::StopTime;
pub use surrogate_key::{SurrogateKey, SurrogateOffset, DEFAULT_SURROGATE_OFFSET};
pub use trip::Trip;
