mod feed_error;
mod feed_reader;
pub mod feed_rows;
mod feed_source;
mod feed_writer;
pub mod gtfs_date_codec;
mod summary;

pub use feed_error::FeedError;
pub use feed_reader::read_dataset;
pub use feed_source::FeedSource;
pub use feed_writer::write_dataset;
pub use summary::{summarize, FeedSummary};
