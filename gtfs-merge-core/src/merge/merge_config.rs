use super::MergeError;
use crate::model::{IdMarker, SurrogateOffset, DEFAULT_ID_MARKER, DEFAULT_SURROGATE_OFFSET};
use serde::{Deserialize, Serialize};

/// configures a [`super::GtfsMerger`]. every field has a default so partial
/// configuration files deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// prefix added to the namespace of every copied string identifier
    pub marker: String,
    /// added to the surrogate key of every copied numeric-keyed row
    pub surrogate_offset: u64,
    /// size of the worker pool used by the parallel phases
    pub parallelism: usize,
    /// if false, fare rules (and the fares they reference) are not merged
    pub include_fare_rules: bool,
    /// timezone assigned to every agency of the merged dataset. when unset,
    /// the timezone of the first priority agency is used.
    pub normalized_timezone: Option<String>,
    /// if true, fail before merging when a priority surrogate key is not
    /// below `surrogate_offset`
    pub validate_surrogate_offset: bool,
    /// show progress bars during parallel phases
    pub show_progress: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            marker: String::from(DEFAULT_ID_MARKER),
            surrogate_offset: DEFAULT_SURROGATE_OFFSET,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            include_fare_rules: true,
            normalized_timezone: None,
            validate_surrogate_offset: true,
            show_progress: false,
        }
    }
}

impl MergeConfig {
    pub fn id_marker(&self) -> IdMarker {
        IdMarker(self.marker.clone())
    }

    pub fn offset(&self) -> SurrogateOffset {
        SurrogateOffset(self.surrogate_offset)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        if self.marker.is_empty() {
            return Err(MergeError::InvalidConfig(String::from(
                "marker must not be empty",
            )));
        }
        if self.surrogate_offset == 0 {
            return Err(MergeError::InvalidConfig(String::from(
                "surrogate_offset must be greater than zero",
            )));
        }
        if self.parallelism == 0 {
            return Err(MergeError::InvalidConfig(String::from(
                "parallelism must be at least 1",
            )));
        }
        Ok(())
    }
}
