use crate::model::FeedId;
use std::collections::HashSet;
use std::sync::Mutex;

/// identifiers discovered while a phase runs. workers only add to it, and
/// it is frozen into an [`IdSet`] once every task of the phase finished.
#[derive(Debug, Default)]
pub struct DiscoverySet {
    ids: Mutex<HashSet<FeedId>>,
}

impl DiscoverySet {
    pub fn new() -> DiscoverySet {
        Self::default()
    }

    /// adds an identifier. safe to call from many workers; duplicates are
    /// ignored.
    pub fn add(&self, id: FeedId) {
        // a poisoned set only ever missed an add from the panicking task,
        // which is reported as a phase failure.
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        ids.insert(id);
    }

    pub fn freeze(self) -> IdSet {
        IdSet(self.ids.into_inner().unwrap_or_else(|e| e.into_inner()))
    }
}

/// an immutable set of rewritten identifiers handed from one phase to the
/// phases that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(HashSet<FeedId>);

impl IdSet {
    pub fn contains(&self, id: &FeedId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        IdSet(self.0.union(&other.0).cloned().collect())
    }
}

impl IntoIterator for IdSet {
    type Item = FeedId;
    type IntoIter = std::collections::hash_set::IntoIter<FeedId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<FeedId> for IdSet {
    fn from_iter<I: IntoIterator<Item = FeedId>>(iter: I) -> Self {
        IdSet(iter.into_iter().collect())
    }
}
