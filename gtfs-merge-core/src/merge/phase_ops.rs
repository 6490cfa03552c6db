//! admission rules and phase runners for the entities that travel with a
//! retained route.
//!
//! every admission function follows the same order: rewrite the reference
//! used for the membership test (the sets already hold rewritten ids), test
//! it, and only then rewrite the row's own identifiers. the runners insert
//! admitted rows into the destination and record the ids later phases need.
use super::{Admission, DiscoverySet, FanOut, IdRewriter, IdSet, MergeError, MergePhase, PhaseTally};
use crate::{
    dataset::{Dataset, HasTable},
    model::{
        Agency, Calendar, CalendarDate, Fare, FareRule, FeedEntity, Frequency, ShapePoint, Stop,
        StopTime, Trip,
    },
};

/// ids discovered by the trip phase.
#[derive(Debug, Clone, Default)]
pub struct TripDiscoveries {
    pub trips: IdSet,
    pub services: IdSet,
    pub shapes: IdSet,
}

pub fn admit_agency(agency: Agency, rw: &IdRewriter) -> Agency {
    Agency {
        id: rw.id(agency.id),
        ..agency
    }
}

pub fn admit_trip(trip: Trip, retained_routes: &IdSet, rw: &IdRewriter) -> Admission<Trip> {
    let route = rw.id(trip.route);
    if !retained_routes.contains(&route) {
        return Admission::DroppedNotReferenced;
    }
    Admission::Included(Trip {
        id: rw.id(trip.id),
        route,
        service: rw.id(trip.service),
        shape: rw.opt_id(trip.shape),
        ..trip
    })
}

pub fn admit_stop_time(
    stop_time: StopTime,
    retained_trips: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<StopTime>, MergeError> {
    let trip = rw.id(stop_time.trip);
    if !retained_trips.contains(&trip) {
        return Ok(Admission::DroppedNotReferenced);
    }
    Ok(Admission::Included(StopTime {
        key: rw.key(stop_time.key)?,
        trip,
        stop: rw.id(stop_time.stop),
        ..stop_time
    }))
}

/// stops are referenced by their own id, so the id is the membership key.
pub fn admit_stop(stop: Stop, referenced_stops: &IdSet, rw: &IdRewriter) -> Admission<Stop> {
    let id = rw.id(stop.id);
    if !referenced_stops.contains(&id) {
        return Admission::DroppedNotReferenced;
    }
    Admission::Included(Stop {
        id,
        parent_station: rw.opt_id(stop.parent_station),
        ..stop
    })
}

pub fn admit_shape_point(
    point: ShapePoint,
    referenced_shapes: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<ShapePoint>, MergeError> {
    let shape = rw.id(point.shape);
    if !referenced_shapes.contains(&shape) {
        return Ok(Admission::DroppedNotReferenced);
    }
    Ok(Admission::Included(ShapePoint {
        key: rw.key(point.key)?,
        shape,
        ..point
    }))
}

pub fn admit_calendar(
    calendar: Calendar,
    referenced_services: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<Calendar>, MergeError> {
    let service = rw.id(calendar.service);
    if !referenced_services.contains(&service) {
        return Ok(Admission::DroppedNotReferenced);
    }
    Ok(Admission::Included(Calendar {
        key: rw.key(calendar.key)?,
        service,
        ..calendar
    }))
}

pub fn admit_calendar_date(
    calendar_date: CalendarDate,
    referenced_services: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<CalendarDate>, MergeError> {
    let service = rw.id(calendar_date.service);
    if !referenced_services.contains(&service) {
        return Ok(Admission::DroppedNotReferenced);
    }
    Ok(Admission::Included(CalendarDate {
        key: rw.key(calendar_date.key)?,
        service,
        ..calendar_date
    }))
}

pub fn admit_frequency(
    frequency: Frequency,
    retained_trips: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<Frequency>, MergeError> {
    let trip = rw.id(frequency.trip);
    if !retained_trips.contains(&trip) {
        return Ok(Admission::DroppedNotReferenced);
    }
    Ok(Admission::Included(Frequency {
        key: rw.key(frequency.key)?,
        trip,
        ..frequency
    }))
}

/// fare rules without a route reference are never admitted.
pub fn admit_fare_rule(
    rule: FareRule,
    retained_routes: &IdSet,
    rw: &IdRewriter,
) -> Result<Admission<FareRule>, MergeError> {
    let route = rw.opt_id(rule.route);
    match &route {
        Some(r) if retained_routes.contains(r) => {}
        _ => return Ok(Admission::DroppedNotReferenced),
    }
    Ok(Admission::Included(FareRule {
        key: rw.key(rule.key)?,
        fare: rw.id(rule.fare),
        route,
        ..rule
    }))
}

/// inserts an admitted row after handing it to `discover`.
fn insert_admitted<T, F>(
    destination: &Dataset,
    admission: Admission<T>,
    discover: F,
) -> Result<Admission<()>, MergeError>
where
    T: FeedEntity,
    Dataset: HasTable<T>,
    F: FnOnce(&T),
{
    match admission {
        Admission::Included(row) => {
            discover(&row);
            destination.insert(row)?;
            Ok(Admission::Included(()))
        }
        Admission::DroppedNotReferenced => Ok(Admission::DroppedNotReferenced),
    }
}

/// inserts the rows admitted by a parallel phase once every task finished,
/// in secondary feed order. duplicate keys fail the phase like any task
/// failure.
fn insert_in_order<T>(
    fan_out: &FanOut,
    phase: MergePhase,
    destination: &Dataset,
    admitted: Vec<T>,
) -> Result<(), MergeError>
where
    T: FeedEntity,
    Dataset: HasTable<T>,
{
    fan_out.sequential(phase, admitted, |row| {
        destination.insert(row)?;
        Ok(Admission::Included(()))
    })?;
    Ok(())
}

/// agency phase: every secondary agency is copied with a rewritten id, then
/// all agencies of the destination receive the same timezone.
pub fn merge_agencies(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    timezone: Option<&str>,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    let tally = fan_out.sequential(MergePhase::Agencies, secondary.agencies().values(), |a| {
        insert_admitted(destination, Admission::Included(admit_agency(a, rw)), |_| {})
    })?;
    if let Some(tz) = timezone {
        log::debug!("normalizing agency timezones to '{tz}'");
        destination
            .agencies()
            .update_all(|agency| agency.timezone = tz.to_string());
    }
    Ok(tally)
}

pub fn merge_trips(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    retained_routes: &IdSet,
    rw: &IdRewriter,
) -> Result<(PhaseTally, TripDiscoveries), MergeError> {
    let trips = DiscoverySet::new();
    let services = DiscoverySet::new();
    let shapes = DiscoverySet::new();
    let (tally, admitted) =
        fan_out.parallel(MergePhase::Trips, secondary.trips().values(), |trip| {
            let admission = admit_trip(trip, retained_routes, rw);
            if let Admission::Included(t) = &admission {
                trips.add(t.id.clone());
                services.add(t.service.clone());
                if let Some(shape) = &t.shape {
                    shapes.add(shape.clone());
                }
            }
            Ok(admission)
        })?;
    insert_in_order(fan_out, MergePhase::Trips, destination, admitted)?;
    let discoveries = TripDiscoveries {
        trips: trips.freeze(),
        services: services.freeze(),
        shapes: shapes.freeze(),
    };
    Ok((tally, discoveries))
}

/// returns the set of stops referenced by the admitted stop times.
pub fn merge_stop_times(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    retained_trips: &IdSet,
    rw: &IdRewriter,
) -> Result<(PhaseTally, IdSet), MergeError> {
    let stops = DiscoverySet::new();
    let (tally, admitted) = fan_out.parallel(
        MergePhase::StopTimes,
        secondary.stop_times().values(),
        |stop_time| {
            let admission = admit_stop_time(stop_time, retained_trips, rw)?;
            if let Admission::Included(st) = &admission {
                stops.add(st.stop.clone());
            }
            Ok(admission)
        },
    )?;
    insert_in_order(fan_out, MergePhase::StopTimes, destination, admitted)?;
    Ok((tally, stops.freeze()))
}

/// parent stations of the referenced secondary stops, rewritten. stations
/// are never named by stop times, so they only reach the merged feed through
/// the stops that belong to them. stations have no parent of their own.
pub fn referenced_stations(
    secondary: &Dataset,
    referenced_stops: &IdSet,
    rw: &IdRewriter,
) -> IdSet {
    secondary
        .stops()
        .values()
        .into_iter()
        .filter(|stop| referenced_stops.contains(&rw.id(stop.id.clone())))
        .filter_map(|stop| rw.opt_id(stop.parent_station))
        .collect()
}

/// stop phase. admits the referenced stops together with their parent
/// stations; a parent missing from the secondary feed is cleared from the
/// merged stops.
pub fn merge_stops(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    referenced_stops: &IdSet,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    let stations = referenced_stations(secondary, referenced_stops, rw);
    let admissible = referenced_stops.union(&stations);
    let (tally, admitted) =
        fan_out.parallel(MergePhase::Stops, secondary.stops().values(), |stop| {
            Ok(admit_stop(stop, &admissible, rw))
        })?;
    insert_in_order(fan_out, MergePhase::Stops, destination, admitted)?;

    let missing = stations
        .into_iter()
        .filter(|station| !destination.stops().contains(station))
        .collect::<IdSet>();
    if !missing.is_empty() {
        log::warn!(
            "{} parent stations are missing from '{}', clearing them from merged stops",
            missing.len(),
            secondary.name
        );
        destination.stops().update_all(|stop| {
            if stop.parent_station.as_ref().is_some_and(|p| missing.contains(p)) {
                stop.parent_station = None;
            }
        });
    }
    Ok(tally)
}

pub fn merge_shape_points(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    referenced_shapes: &IdSet,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    let (tally, admitted) = fan_out.parallel(
        MergePhase::ShapePoints,
        secondary.shape_points().values(),
        |point| admit_shape_point(point, referenced_shapes, rw),
    )?;
    insert_in_order(fan_out, MergePhase::ShapePoints, destination, admitted)?;
    Ok(tally)
}

/// calendar phase, covering both calendar.txt and calendar_dates.txt rows.
pub fn merge_calendars(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    referenced_services: &IdSet,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    let calendars = fan_out.sequential(
        MergePhase::Calendars,
        secondary.calendars().values(),
        |calendar| {
            let admission = admit_calendar(calendar, referenced_services, rw)?;
            insert_admitted(destination, admission, |_| {})
        },
    )?;
    let calendar_dates = fan_out.sequential(
        MergePhase::Calendars,
        secondary.calendar_dates().values(),
        |calendar_date| {
            let admission = admit_calendar_date(calendar_date, referenced_services, rw)?;
            insert_admitted(destination, admission, |_| {})
        },
    )?;
    Ok(calendars + calendar_dates)
}

pub fn merge_frequencies(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    retained_trips: &IdSet,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    fan_out.sequential(
        MergePhase::Frequencies,
        secondary.frequencies().values(),
        |frequency| {
            let admission = admit_frequency(frequency, retained_trips, rw)?;
            insert_admitted(destination, admission, |_| {})
        },
    )
}

/// fare rule phase. fares are not scanned on their own: the fare of each
/// admitted rule is looked up in the secondary dataset, rewritten and copied
/// here, once per fare.
pub fn merge_fare_rules(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    retained_routes: &IdSet,
    rw: &IdRewriter,
) -> Result<PhaseTally, MergeError> {
    let mut fares_copied = 0;
    let tally = fan_out.sequential(
        MergePhase::FareRules,
        secondary.fare_rules().values(),
        |rule| {
            // lookup key must be taken before the rule's fare id is rewritten
            let source_key = rule.key;
            let source_fare_id = rule.fare.clone();
            let source_fare = secondary.fares().get(&source_fare_id);
            let admission = admit_fare_rule(rule, retained_routes, rw)?;
            if matches!(admission, Admission::Included(_)) {
                match source_fare {
                    Some(fare) => {
                        let fare_id = rw.id(fare.id.clone());
                        if !destination.fares().contains(&fare_id) {
                            destination.insert(Fare {
                                id: fare_id,
                                agency: rw.opt_id(fare.agency),
                                ..fare
                            })?;
                            fares_copied += 1;
                        }
                    }
                    None => log::warn!(
                        "fare rule {} references fare {} which is missing from '{}'",
                        source_key,
                        source_fare_id,
                        secondary.name
                    ),
                }
            }
            insert_admitted(destination, admission, |_| {})
        },
    )?;
    log::debug!("copied {fares_copied} fares referenced by merged fare rules");
    Ok(tally)
}
