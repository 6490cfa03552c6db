//! row builders shared by the merge tests.
use crate::model::{
    Agency, Calendar, CalendarDate, Fare, FareRule, FeedId, Frequency, Route, ServiceException,
    ShapePoint, Stop, StopTime, SurrogateKey, Trip,
};
use chrono::NaiveDate;

pub fn agency(ns: &str, id: &str, timezone: &str) -> Agency {
    Agency {
        id: FeedId::original(ns, id),
        name: format!("agency {id}"),
        url: String::from("https://example.com"),
        timezone: timezone.to_string(),
        lang: None,
        phone: None,
        fare_url: None,
        email: None,
    }
}

pub fn route(ns: &str, id: &str, agency: &str, short_name: &str) -> Route {
    Route {
        id: FeedId::original(ns, id),
        agency: Some(FeedId::original(ns, agency)),
        short_name: Some(short_name.to_string()),
        long_name: None,
        desc: None,
        route_type: 3,
        url: None,
        color: None,
        text_color: None,
        sort_order: None,
    }
}

pub fn trip(ns: &str, id: &str, route: &str, service: &str, shape: Option<&str>) -> Trip {
    Trip {
        id: FeedId::original(ns, id),
        route: FeedId::original(ns, route),
        service: FeedId::original(ns, service),
        shape: shape.map(|s| FeedId::original(ns, s)),
        headsign: None,
        short_name: None,
        direction_id: Some(0),
        block_id: None,
        wheelchair_accessible: None,
        bikes_allowed: None,
    }
}

pub fn stop_time(key: u64, ns: &str, trip: &str, stop: &str, sequence: u32) -> StopTime {
    StopTime {
        key: SurrogateKey(key),
        trip: FeedId::original(ns, trip),
        stop: FeedId::original(ns, stop),
        stop_sequence: sequence,
        arrival_time: Some(String::from("08:00:00")),
        departure_time: Some(String::from("08:00:30")),
        stop_headsign: None,
        pickup_type: None,
        drop_off_type: None,
        shape_dist_traveled: None,
        timepoint: None,
    }
}

pub fn stop(ns: &str, id: &str) -> Stop {
    Stop {
        id: FeedId::original(ns, id),
        code: None,
        name: Some(format!("stop {id}")),
        desc: None,
        latitude: Some(41.89),
        longitude: Some(12.49),
        zone_id: None,
        url: None,
        location_type: None,
        parent_station: None,
        timezone: None,
        wheelchair_boarding: None,
        platform_code: None,
    }
}

pub fn shape_point(key: u64, ns: &str, shape: &str, sequence: u32) -> ShapePoint {
    ShapePoint {
        key: SurrogateKey(key),
        shape: FeedId::original(ns, shape),
        latitude: 41.89,
        longitude: 12.49,
        sequence,
        dist_traveled: None,
    }
}

pub fn calendar(key: u64, ns: &str, service: &str) -> Calendar {
    Calendar {
        key: SurrogateKey(key),
        service: FeedId::original(ns, service),
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: false,
        sunday: false,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
    }
}

pub fn calendar_date(key: u64, ns: &str, service: &str) -> CalendarDate {
    CalendarDate {
        key: SurrogateKey(key),
        service: FeedId::original(ns, service),
        date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap_or_default(),
        exception: ServiceException::Removed,
    }
}

pub fn frequency(key: u64, ns: &str, trip: &str) -> Frequency {
    Frequency {
        key: SurrogateKey(key),
        trip: FeedId::original(ns, trip),
        start_time: String::from("06:00:00"),
        end_time: String::from("09:00:00"),
        headway_secs: 600,
        exact_times: None,
    }
}

pub fn fare(ns: &str, id: &str, agency: &str) -> Fare {
    Fare {
        id: FeedId::original(ns, id),
        price: String::from("1.50"),
        currency_type: String::from("EUR"),
        payment_method: 0,
        transfers: None,
        agency: Some(FeedId::original(ns, agency)),
        transfer_duration: None,
    }
}

pub fn fare_rule(key: u64, ns: &str, fare: &str, route: Option<&str>) -> FareRule {
    FareRule {
        key: SurrogateKey(key),
        fare: FeedId::original(ns, fare),
        route: route.map(|r| FeedId::original(ns, r)),
        origin_id: None,
        destination_id: None,
        contains_id: None,
    }
}
