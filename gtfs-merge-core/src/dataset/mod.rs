#[allow(clippy::module_inception)]
mod dataset;
mod dataset_error;
mod entity_table;

pub use dataset::{Dataset, HasTable};
pub use dataset_error::DatasetError;
pub use entity_table::EntityTable;
