use std::{fmt::Display, hash::Hash};

/// a row of one GTFS table as held by a [`crate::dataset::Dataset`].
pub trait FeedEntity: Clone + Send + Sync + 'static {
    /// key under which the row is stored in its table
    type Key: Clone + Eq + Hash + Display + Send + Sync;

    /// name of the table, used in logging and error messages
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;
}
