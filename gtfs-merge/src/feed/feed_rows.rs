//! csv rows of the GTFS tables read and written by this crate, and their
//! conversion to and from [`gtfs_merge_core::model`] entities.
use super::{gtfs_date_codec, FeedError};
use chrono::NaiveDate;
use gtfs_merge_core::model::{
    Agency, Calendar, CalendarDate, Fare, FareRule, FeedEntity, FeedId, Frequency, Route,
    ServiceException, ShapePoint, Stop, StopTime, SurrogateKey, Trip,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// values shared by every row read from one feed.
#[derive(Clone, Debug)]
pub struct RowContext {
    pub namespace: String,
    /// agency that routes and fares without an agency_id belong to, set when
    /// the feed has exactly one agency
    pub default_agency: Option<String>,
}

impl RowContext {
    fn id(&self, local: &str) -> FeedId {
        FeedId::original(&self.namespace, local)
    }

    fn opt_id(&self, local: &Option<String>) -> Option<FeedId> {
        local
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| self.id(l))
    }

    fn agency_id(&self, local: &Option<String>) -> Option<FeedId> {
        self.opt_id(local)
            .or_else(|| self.default_agency.as_deref().map(|a| self.id(a)))
    }
}

/// a row of one GTFS table.
pub trait FeedRow: Serialize + DeserializeOwned {
    type Entity: FeedEntity;
    const FILENAME: &'static str;

    /// builds the entity for this row. `key` is the 1-based row number,
    /// used as the surrogate key of tables without a natural identifier.
    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<Self::Entity, String>;

    fn from_entity(entity: &Self::Entity) -> Self;
}

fn gtfs_id(id: &FeedId) -> String {
    id.to_gtfs_string()
}

fn opt_gtfs_id(id: &Option<FeedId>) -> Option<String> {
    id.as_ref().map(FeedId::to_gtfs_string)
}

fn flag(value: u8, field: &str) -> Result<bool, String> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(format!("{field} must be 0 or 1, found {other}")),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgencyRow {
    pub agency_id: Option<String>,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: Option<String>,
    pub agency_phone: Option<String>,
    pub agency_fare_url: Option<String>,
    pub agency_email: Option<String>,
}

impl AgencyRow {
    /// agency_id may be omitted in single-agency feeds, in which case the
    /// agency name stands in for it.
    pub fn local_id(&self) -> &str {
        match self.agency_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.agency_name,
        }
    }
}

impl FeedRow for AgencyRow {
    type Entity = Agency;
    const FILENAME: &'static str = "agency.txt";

    fn into_entity(self, ctx: &RowContext, _key: SurrogateKey) -> Result<Agency, String> {
        Ok(Agency {
            id: ctx.id(self.local_id()),
            name: self.agency_name,
            url: self.agency_url,
            timezone: self.agency_timezone,
            lang: self.agency_lang,
            phone: self.agency_phone,
            fare_url: self.agency_fare_url,
            email: self.agency_email,
        })
    }

    fn from_entity(agency: &Agency) -> AgencyRow {
        AgencyRow {
            agency_id: Some(gtfs_id(&agency.id)),
            agency_name: agency.name.clone(),
            agency_url: agency.url.clone(),
            agency_timezone: agency.timezone.clone(),
            agency_lang: agency.lang.clone(),
            agency_phone: agency.phone.clone(),
            agency_fare_url: agency.fare_url.clone(),
            agency_email: agency.email.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_desc: Option<String>,
    pub route_type: u16,
    pub route_url: Option<String>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
    pub route_sort_order: Option<u32>,
}

impl FeedRow for RouteRow {
    type Entity = Route;
    const FILENAME: &'static str = "routes.txt";

    fn into_entity(self, ctx: &RowContext, _key: SurrogateKey) -> Result<Route, String> {
        Ok(Route {
            id: ctx.id(&self.route_id),
            agency: ctx.agency_id(&self.agency_id),
            short_name: self.route_short_name.filter(|s| !s.is_empty()),
            long_name: self.route_long_name,
            desc: self.route_desc,
            route_type: self.route_type,
            url: self.route_url,
            color: self.route_color,
            text_color: self.route_text_color,
            sort_order: self.route_sort_order,
        })
    }

    fn from_entity(route: &Route) -> RouteRow {
        RouteRow {
            route_id: gtfs_id(&route.id),
            agency_id: opt_gtfs_id(&route.agency),
            route_short_name: route.short_name.clone(),
            route_long_name: route.long_name.clone(),
            route_desc: route.desc.clone(),
            route_type: route.route_type,
            route_url: route.url.clone(),
            route_color: route.color.clone(),
            route_text_color: route.text_color.clone(),
            route_sort_order: route.sort_order,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
    pub direction_id: Option<u8>,
    pub block_id: Option<String>,
    pub shape_id: Option<String>,
    pub wheelchair_accessible: Option<u8>,
    pub bikes_allowed: Option<u8>,
}

impl FeedRow for TripRow {
    type Entity = Trip;
    const FILENAME: &'static str = "trips.txt";

    fn into_entity(self, ctx: &RowContext, _key: SurrogateKey) -> Result<Trip, String> {
        Ok(Trip {
            id: ctx.id(&self.trip_id),
            route: ctx.id(&self.route_id),
            service: ctx.id(&self.service_id),
            shape: ctx.opt_id(&self.shape_id),
            headsign: self.trip_headsign,
            short_name: self.trip_short_name,
            direction_id: self.direction_id,
            block_id: self.block_id,
            wheelchair_accessible: self.wheelchair_accessible,
            bikes_allowed: self.bikes_allowed,
        })
    }

    fn from_entity(trip: &Trip) -> TripRow {
        TripRow {
            route_id: gtfs_id(&trip.route),
            service_id: gtfs_id(&trip.service),
            trip_id: gtfs_id(&trip.id),
            trip_headsign: trip.headsign.clone(),
            trip_short_name: trip.short_name.clone(),
            direction_id: trip.direction_id,
            block_id: trip.block_id.clone(),
            shape_id: opt_gtfs_id(&trip.shape),
            wheelchair_accessible: trip.wheelchair_accessible,
            bikes_allowed: trip.bikes_allowed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
    pub pickup_type: Option<u8>,
    pub drop_off_type: Option<u8>,
    pub shape_dist_traveled: Option<f64>,
    pub timepoint: Option<u8>,
}

impl FeedRow for StopTimeRow {
    type Entity = StopTime;
    const FILENAME: &'static str = "stop_times.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<StopTime, String> {
        Ok(StopTime {
            key,
            trip: ctx.id(&self.trip_id),
            stop: ctx.id(&self.stop_id),
            stop_sequence: self.stop_sequence,
            arrival_time: self.arrival_time,
            departure_time: self.departure_time,
            stop_headsign: self.stop_headsign,
            pickup_type: self.pickup_type,
            drop_off_type: self.drop_off_type,
            shape_dist_traveled: self.shape_dist_traveled,
            timepoint: self.timepoint,
        })
    }

    fn from_entity(stop_time: &StopTime) -> StopTimeRow {
        StopTimeRow {
            trip_id: gtfs_id(&stop_time.trip),
            arrival_time: stop_time.arrival_time.clone(),
            departure_time: stop_time.departure_time.clone(),
            stop_id: gtfs_id(&stop_time.stop),
            stop_sequence: stop_time.stop_sequence,
            stop_headsign: stop_time.stop_headsign.clone(),
            pickup_type: stop_time.pickup_type,
            drop_off_type: stop_time.drop_off_type,
            shape_dist_traveled: stop_time.shape_dist_traveled,
            timepoint: stop_time.timepoint,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: Option<String>,
    pub stop_desc: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub zone_id: Option<String>,
    pub stop_url: Option<String>,
    pub location_type: Option<u8>,
    pub parent_station: Option<String>,
    pub stop_timezone: Option<String>,
    pub wheelchair_boarding: Option<u8>,
    pub platform_code: Option<String>,
}

impl FeedRow for StopRow {
    type Entity = Stop;
    const FILENAME: &'static str = "stops.txt";

    fn into_entity(self, ctx: &RowContext, _key: SurrogateKey) -> Result<Stop, String> {
        Ok(Stop {
            id: ctx.id(&self.stop_id),
            code: self.stop_code,
            name: self.stop_name,
            desc: self.stop_desc,
            latitude: self.stop_lat,
            longitude: self.stop_lon,
            zone_id: self.zone_id,
            url: self.stop_url,
            location_type: self.location_type,
            parent_station: ctx.opt_id(&self.parent_station),
            timezone: self.stop_timezone,
            wheelchair_boarding: self.wheelchair_boarding,
            platform_code: self.platform_code,
        })
    }

    fn from_entity(stop: &Stop) -> StopRow {
        StopRow {
            stop_id: gtfs_id(&stop.id),
            stop_code: stop.code.clone(),
            stop_name: stop.name.clone(),
            stop_desc: stop.desc.clone(),
            stop_lat: stop.latitude,
            stop_lon: stop.longitude,
            zone_id: stop.zone_id.clone(),
            stop_url: stop.url.clone(),
            location_type: stop.location_type,
            parent_station: opt_gtfs_id(&stop.parent_station),
            stop_timezone: stop.timezone.clone(),
            wheelchair_boarding: stop.wheelchair_boarding,
            platform_code: stop.platform_code.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapePointRow {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
    pub shape_dist_traveled: Option<f64>,
}

impl FeedRow for ShapePointRow {
    type Entity = ShapePoint;
    const FILENAME: &'static str = "shapes.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<ShapePoint, String> {
        Ok(ShapePoint {
            key,
            shape: ctx.id(&self.shape_id),
            latitude: self.shape_pt_lat,
            longitude: self.shape_pt_lon,
            sequence: self.shape_pt_sequence,
            dist_traveled: self.shape_dist_traveled,
        })
    }

    fn from_entity(point: &ShapePoint) -> ShapePointRow {
        ShapePointRow {
            shape_id: gtfs_id(&point.shape),
            shape_pt_lat: point.latitude,
            shape_pt_lon: point.longitude,
            shape_pt_sequence: point.sequence,
            shape_dist_traveled: point.dist_traveled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    #[serde(
        deserialize_with = "gtfs_date_codec::deserialize_naive_date",
        serialize_with = "gtfs_date_codec::serialize_naive_date"
    )]
    pub start_date: NaiveDate,
    #[serde(
        deserialize_with = "gtfs_date_codec::deserialize_naive_date",
        serialize_with = "gtfs_date_codec::serialize_naive_date"
    )]
    pub end_date: NaiveDate,
}

impl FeedRow for CalendarRow {
    type Entity = Calendar;
    const FILENAME: &'static str = "calendar.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<Calendar, String> {
        Ok(Calendar {
            key,
            service: ctx.id(&self.service_id),
            monday: flag(self.monday, "monday")?,
            tuesday: flag(self.tuesday, "tuesday")?,
            wednesday: flag(self.wednesday, "wednesday")?,
            thursday: flag(self.thursday, "thursday")?,
            friday: flag(self.friday, "friday")?,
            saturday: flag(self.saturday, "saturday")?,
            sunday: flag(self.sunday, "sunday")?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }

    fn from_entity(calendar: &Calendar) -> CalendarRow {
        CalendarRow {
            service_id: gtfs_id(&calendar.service),
            monday: calendar.monday as u8,
            tuesday: calendar.tuesday as u8,
            wednesday: calendar.wednesday as u8,
            thursday: calendar.thursday as u8,
            friday: calendar.friday as u8,
            saturday: calendar.saturday as u8,
            sunday: calendar.sunday as u8,
            start_date: calendar.start_date,
            end_date: calendar.end_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarDateRow {
    pub service_id: String,
    #[serde(
        deserialize_with = "gtfs_date_codec::deserialize_naive_date",
        serialize_with = "gtfs_date_codec::serialize_naive_date"
    )]
    pub date: NaiveDate,
    pub exception_type: u8,
}

impl FeedRow for CalendarDateRow {
    type Entity = CalendarDate;
    const FILENAME: &'static str = "calendar_dates.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<CalendarDate, String> {
        let exception = ServiceException::from_code(self.exception_type).ok_or_else(|| {
            format!(
                "exception_type must be 1 or 2, found {}",
                self.exception_type
            )
        })?;
        Ok(CalendarDate {
            key,
            service: ctx.id(&self.service_id),
            date: self.date,
            exception,
        })
    }

    fn from_entity(calendar_date: &CalendarDate) -> CalendarDateRow {
        CalendarDateRow {
            service_id: gtfs_id(&calendar_date.service),
            date: calendar_date.date,
            exception_type: calendar_date.exception.code(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub trip_id: String,
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
    pub exact_times: Option<u8>,
}

impl FeedRow for FrequencyRow {
    type Entity = Frequency;
    const FILENAME: &'static str = "frequencies.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<Frequency, String> {
        Ok(Frequency {
            key,
            trip: ctx.id(&self.trip_id),
            start_time: self.start_time,
            end_time: self.end_time,
            headway_secs: self.headway_secs,
            exact_times: self.exact_times,
        })
    }

    fn from_entity(frequency: &Frequency) -> FrequencyRow {
        FrequencyRow {
            trip_id: gtfs_id(&frequency.trip),
            start_time: frequency.start_time.clone(),
            end_time: frequency.end_time.clone(),
            headway_secs: frequency.headway_secs,
            exact_times: frequency.exact_times,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareRow {
    pub fare_id: String,
    pub price: String,
    pub currency_type: String,
    pub payment_method: u8,
    pub transfers: Option<u8>,
    pub agency_id: Option<String>,
    pub transfer_duration: Option<u32>,
}

impl FeedRow for FareRow {
    type Entity = Fare;
    const FILENAME: &'static str = "fare_attributes.txt";

    fn into_entity(self, ctx: &RowContext, _key: SurrogateKey) -> Result<Fare, String> {
        Ok(Fare {
            id: ctx.id(&self.fare_id),
            price: self.price,
            currency_type: self.currency_type,
            payment_method: self.payment_method,
            transfers: self.transfers,
            agency: ctx.agency_id(&self.agency_id),
            transfer_duration: self.transfer_duration,
        })
    }

    fn from_entity(fare: &Fare) -> FareRow {
        FareRow {
            fare_id: gtfs_id(&fare.id),
            price: fare.price.clone(),
            currency_type: fare.currency_type.clone(),
            payment_method: fare.payment_method,
            transfers: fare.transfers,
            agency_id: opt_gtfs_id(&fare.agency),
            transfer_duration: fare.transfer_duration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareRuleRow {
    pub fare_id: String,
    pub route_id: Option<String>,
    pub origin_id: Option<String>,
    pub destination_id: Option<String>,
    pub contains_id: Option<String>,
}

impl FeedRow for FareRuleRow {
    type Entity = FareRule;
    const FILENAME: &'static str = "fare_rules.txt";

    fn into_entity(self, ctx: &RowContext, key: SurrogateKey) -> Result<FareRule, String> {
        Ok(FareRule {
            key,
            fare: ctx.id(&self.fare_id),
            route: ctx.opt_id(&self.route_id),
            origin_id: self.origin_id,
            destination_id: self.destination_id,
            contains_id: self.contains_id,
        })
    }

    fn from_entity(rule: &FareRule) -> FareRuleRow {
        FareRuleRow {
            fare_id: gtfs_id(&rule.fare),
            route_id: opt_gtfs_id(&rule.route),
            origin_id: rule.origin_id.clone(),
            destination_id: rule.destination_id.clone(),
            contains_id: rule.contains_id.clone(),
        }
    }
}

/// parses every row of a table. errors name the 1-based data row.
pub fn parse_rows<R: FeedRow>(bytes: &[u8]) -> Result<Vec<R>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);
    reader
        .deserialize::<R>()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|source| FeedError::RowError {
                filename: R::FILENAME,
                row: idx + 1,
                source,
            })
        })
        .collect()
}
