/// result of testing a secondary row against the identifier sets of the
/// earlier phases.
#[derive(Clone, Debug, PartialEq)]
pub enum Admission<T> {
    /// the row is reachable from a retained route, with identifiers rewritten
    Included(T),
    /// the row's reference is not in the retained set; it is discarded
    DroppedNotReferenced,
}

impl<T> Admission<T> {
    pub fn included(self) -> Option<T> {
        match self {
            Admission::Included(t) => Some(t),
            Admission::DroppedNotReferenced => None,
        }
    }
}
