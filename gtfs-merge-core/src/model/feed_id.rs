use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// default marker prepended to the namespace of every identifier copied
/// from a secondary dataset.
pub const DEFAULT_ID_MARKER: &str = "OTHER_";

/// compound identifier of a GTFS entity. the namespace scopes the local id
/// to the dataset (or agency) it was read from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub namespace: String,
    pub local: String,
}

impl EntityId {
    pub fn new(namespace: &str, local: &str) -> EntityId {
        EntityId {
            namespace: namespace.to_string(),
            local: local.to_string(),
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.namespace, self.local)
    }
}

/// an identifier tagged with whether it has already received the marker.
///
/// rewriting is only ever applied to [`FeedId::Original`] values, so a value
/// reached from several phases is marked exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum FeedId {
    Original(EntityId),
    Rewritten(EntityId),
}

impl FeedId {
    pub fn original(namespace: &str, local: &str) -> FeedId {
        FeedId::Original(EntityId::new(namespace, local))
    }

    pub fn entity_id(&self) -> &EntityId {
        match self {
            FeedId::Original(id) => id,
            FeedId::Rewritten(id) => id,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, FeedId::Rewritten(_))
    }

    /// marks this identifier with the marker prefix. a no-op for identifiers
    /// that were already rewritten.
    pub fn rewrite(self, marker: &IdMarker) -> FeedId {
        match self {
            FeedId::Original(id) => FeedId::Rewritten(EntityId {
                namespace: format!("{}{}", marker.0, id.namespace),
                local: id.local,
            }),
            rewritten @ FeedId::Rewritten(_) => rewritten,
        }
    }

    /// the value written to a GTFS table. original identifiers keep their
    /// local id so priority rows are written back unchanged.
    pub fn to_gtfs_string(&self) -> String {
        match self {
            FeedId::Original(id) => id.local.clone(),
            FeedId::Rewritten(id) => id.to_string(),
        }
    }
}

impl Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedId::Original(id) => write!(f, "{id}"),
            FeedId::Rewritten(id) => write!(f, "{id} (rewritten)"),
        }
    }
}

/// the marker prefix applied to rewritten namespaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMarker(pub String);

impl Default for IdMarker {
    fn default() -> Self {
        IdMarker(String::from(DEFAULT_ID_MARKER))
    }
}

impl Display for IdMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
