use super::MergeError;
use crate::model::{FeedId, IdMarker, SurrogateKey, SurrogateOffset};

/// rewrites identifiers of rows copied from a secondary dataset.
///
/// string identifiers receive the marker prefix at most once; the tag on
/// [`FeedId`] makes repeated rewrites from different phases no-ops.
/// surrogate keys are offset, which is not idempotent: each copied row has
/// its key offset by exactly one phase.
#[derive(Clone, Debug, Default)]
pub struct IdRewriter {
    pub marker: IdMarker,
    pub offset: SurrogateOffset,
}

impl IdRewriter {
    pub fn new(marker: IdMarker, offset: SurrogateOffset) -> IdRewriter {
        IdRewriter { marker, offset }
    }

    pub fn id(&self, id: FeedId) -> FeedId {
        id.rewrite(&self.marker)
    }

    pub fn opt_id(&self, id: Option<FeedId>) -> Option<FeedId> {
        id.map(|i| self.id(i))
    }

    pub fn key(&self, key: SurrogateKey) -> Result<SurrogateKey, MergeError> {
        key.checked_offset(&self.offset)
            .ok_or(MergeError::SurrogateKeyOverflow {
                key,
                offset: self.offset,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use proptest::prelude::*;

    #[test]
    fn test_key_offset() {
        let rw = IdRewriter::new(IdMarker::default(), SurrogateOffset(1000));
        assert_eq!(rw.key(SurrogateKey(7)).unwrap(), SurrogateKey(1007));
    }

    #[test]
    fn test_key_overflow_is_an_error() {
        let rw = IdRewriter::new(IdMarker::default(), SurrogateOffset(10));
        let result = rw.key(SurrogateKey(u64::MAX - 5));
        assert!(matches!(
            result,
            Err(MergeError::SurrogateKeyOverflow { .. })
        ));
    }

    #[test]
    fn test_opt_id_none_stays_none() {
        let rw = IdRewriter::default();
        assert_eq!(rw.opt_id(None), None);
    }

    proptest! {
        #[test]
        fn rewrite_twice_equals_rewrite_once(
            namespace in "[A-Za-z0-9_]{0,12}",
            local in "[A-Za-z0-9_:-]{1,16}",
            marker in "[A-Z]{1,6}_",
        ) {
            let rw = IdRewriter::new(IdMarker(marker.clone()), SurrogateOffset::default());
            let once = rw.id(FeedId::original(&namespace, &local));
            let twice = rw.id(once.clone());
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(
                once,
                FeedId::Rewritten(EntityId::new(&format!("{marker}{namespace}"), &local))
            );
        }
    }
}
