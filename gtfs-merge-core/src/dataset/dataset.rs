use super::{DatasetError, EntityTable};
use crate::model::{
    Agency, Calendar, CalendarDate, Fare, FareRule, FeedEntity, Frequency, Route, ShapePoint,
    Stop, StopTime, SurrogateKey, Trip,
};

/// an in-memory GTFS dataset, one [`EntityTable`] per entity class.
///
/// every table can be read and written through a shared reference, so a
/// dataset can receive rows from many workers during a merge phase.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub name: String,
    agencies: EntityTable<Agency>,
    routes: EntityTable<Route>,
    trips: EntityTable<Trip>,
    stop_times: EntityTable<StopTime>,
    stops: EntityTable<Stop>,
    shape_points: EntityTable<ShapePoint>,
    calendars: EntityTable<Calendar>,
    calendar_dates: EntityTable<CalendarDate>,
    frequencies: EntityTable<Frequency>,
    fares: EntityTable<Fare>,
    fare_rules: EntityTable<FareRule>,
}

/// typed access to the table holding rows of type `T`.
pub trait HasTable<T: FeedEntity> {
    fn table(&self) -> &EntityTable<T>;
}

macro_rules! has_table {
    ($entity:ty, $field:ident) => {
        impl HasTable<$entity> for Dataset {
            fn table(&self) -> &EntityTable<$entity> {
                &self.$field
            }
        }

        impl Dataset {
            pub fn $field(&self) -> &EntityTable<$entity> {
                &self.$field
            }
        }
    };
}

has_table!(Agency, agencies);
has_table!(Route, routes);
has_table!(Trip, trips);
has_table!(StopTime, stop_times);
has_table!(Stop, stops);
has_table!(ShapePoint, shape_points);
has_table!(Calendar, calendars);
has_table!(CalendarDate, calendar_dates);
has_table!(Frequency, frequencies);
has_table!(Fare, fares);
has_table!(FareRule, fare_rules);

impl Dataset {
    pub fn new(name: &str) -> Dataset {
        Dataset {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// adds a row to the table of its class. see [`EntityTable::insert`].
    pub fn insert<T>(&self, row: T) -> Result<(), DatasetError>
    where
        T: FeedEntity,
        Self: HasTable<T>,
    {
        <Self as HasTable<T>>::table(self).insert(row)
    }

    /// adds every row, stopping at the first duplicate key.
    pub fn extend<T, I>(&self, rows: I) -> Result<(), DatasetError>
    where
        T: FeedEntity,
        I: IntoIterator<Item = T>,
        Self: HasTable<T>,
    {
        let table = <Self as HasTable<T>>::table(self);
        rows.into_iter().try_for_each(|row| table.insert(row))
    }

    /// row counts by table name, in GTFS file order.
    pub fn table_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (Agency::TABLE, self.agencies.len()),
            (Route::TABLE, self.routes.len()),
            (Trip::TABLE, self.trips.len()),
            (StopTime::TABLE, self.stop_times.len()),
            (Stop::TABLE, self.stops.len()),
            (ShapePoint::TABLE, self.shape_points.len()),
            (Calendar::TABLE, self.calendars.len()),
            (CalendarDate::TABLE, self.calendar_dates.len()),
            (Frequency::TABLE, self.frequencies.len()),
            (Fare::TABLE, self.fares.len()),
            (FareRule::TABLE, self.fare_rules.len()),
        ]
    }

    /// largest surrogate key per numeric-keyed table, skipping empty tables.
    pub fn max_surrogate_keys(&self) -> Vec<(&'static str, SurrogateKey)> {
        [
            (StopTime::TABLE, self.stop_times.max_surrogate_key()),
            (ShapePoint::TABLE, self.shape_points.max_surrogate_key()),
            (Calendar::TABLE, self.calendars.max_surrogate_key()),
            (CalendarDate::TABLE, self.calendar_dates.max_surrogate_key()),
            (Frequency::TABLE, self.frequencies.max_surrogate_key()),
            (FareRule::TABLE, self.fare_rules.max_surrogate_key()),
        ]
        .into_iter()
        .filter_map(|(table, key)| key.map(|k| (table, k)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeedId;

    #[test]
    fn test_generic_insert_routes_to_table() {
        let dataset = Dataset::new("test");
        let fare = Fare {
            id: FeedId::original("A", "F1"),
            price: String::from("1.50"),
            currency_type: String::from("EUR"),
            payment_method: 0,
            transfers: None,
            agency: None,
            transfer_duration: None,
        };
        dataset.insert(fare.clone()).unwrap();
        assert_eq!(dataset.fares().len(), 1);
        assert!(dataset.insert(fare).is_err());
        let counts = dataset.table_counts();
        assert!(counts.contains(&("fare_attributes", 1)));
        assert!(counts.contains(&("trips", 0)));
    }

    #[test]
    fn test_max_surrogate_keys_skips_empty_tables() {
        let dataset = Dataset::new("test");
        dataset
            .extend((1..=3).map(|k| FareRule {
                key: SurrogateKey(k),
                fare: FeedId::original("A", "F1"),
                route: None,
                origin_id: None,
                destination_id: None,
                contains_id: None,
            }))
            .unwrap();
        assert_eq!(
            dataset.max_surrogate_keys(),
            vec![("fare_rules", SurrogateKey(3))]
        );
    }
}
