//! selective merge of two GTFS datasets.
//!
//! a *priority* dataset is kept intact and extended with the routes of a
//! *secondary* dataset that have no short-name match in it, together with
//! every trip, stop time, stop, shape, calendar, frequency and fare that
//! travels with those routes. copied identifiers are rewritten so they never
//! collide with priority identifiers. see [`merge::GtfsMerger`].
pub mod dataset;
pub mod merge;
pub mod model;
