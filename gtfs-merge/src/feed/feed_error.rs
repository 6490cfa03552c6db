use gtfs_merge_core::dataset::DatasetError;

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("failed opening GTFS feed '{path}': {source}")]
    OpenError {
        path: String,
        source: std::io::Error,
    },
    #[error("failed reading zip archive '{path}': {source}")]
    ArchiveError {
        path: String,
        source: zip::result::ZipError,
    },
    #[error("GTFS feed '{path}' is missing required table '{filename}'")]
    MissingTable { path: String, filename: &'static str },
    #[error("failed parsing row {row} of '{filename}': {source}")]
    RowError {
        filename: &'static str,
        row: usize,
        source: csv::Error,
    },
    #[error("invalid row {row} of '{filename}': {msg}")]
    InvalidRow {
        filename: &'static str,
        row: usize,
        msg: String,
    },
    #[error("output '{0}' already exists, use --overwrite to replace it")]
    OutputExists(String),
    #[error("failed writing '{path}': {msg}")]
    WriteError { path: String, msg: String },
    #[error("failed to build progress bar: {0}")]
    ProgressBarError(String),
    #[error(transparent)]
    DatasetError(#[from] DatasetError),
}
