use super::{FeedEntity, FeedId, SurrogateKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// weekly service pattern of a service id, from calendar.txt
#[derive(Clone, Debug, PartialEq)]
pub struct Calendar {
    pub key: SurrogateKey,
    pub service: FeedId,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FeedEntity for Calendar {
    type Key = SurrogateKey;
    const TABLE: &'static str = "calendar";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}

/// GTFS `exception_type`: 1 adds service on a date, 2 removes it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceException {
    Added,
    Removed,
}

impl ServiceException {
    pub fn from_code(code: u8) -> Option<ServiceException> {
        match code {
            1 => Some(ServiceException::Added),
            2 => Some(ServiceException::Removed),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ServiceException::Added => 1,
            ServiceException::Removed => 2,
        }
    }
}

/// a single-date exception of a service id, from calendar_dates.txt
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarDate {
    pub key: SurrogateKey,
    pub service: FeedId,
    pub date: NaiveDate,
    pub exception: ServiceException,
}

impl FeedEntity for CalendarDate {
    type Key = SurrogateKey;
    const TABLE: &'static str = "calendar_dates";

    fn key(&self) -> SurrogateKey {
        self.key
    }
}
