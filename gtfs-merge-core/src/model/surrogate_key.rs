use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// default offset added to the surrogate key of every row copied from a
/// secondary dataset.
pub const DEFAULT_SURROGATE_OFFSET: u64 = 1_000_000_000;

/// numeric key of a GTFS row with no natural identifier (stop times, shape
/// points, calendar rows, frequencies, fare rules). assigned by the reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurrogateKey(pub u64);

impl SurrogateKey {
    /// adds the offset to this key, or None on overflow.
    ///
    /// this is not idempotent: callers apply it exactly once per row.
    pub fn checked_offset(&self, offset: &SurrogateOffset) -> Option<SurrogateKey> {
        self.0.checked_add(offset.0).map(SurrogateKey)
    }
}

impl Display for SurrogateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurrogateOffset(pub u64);

impl Default for SurrogateOffset {
    fn default() -> Self {
        SurrogateOffset(DEFAULT_SURROGATE_OFFSET)
    }
}

impl Display for SurrogateOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
