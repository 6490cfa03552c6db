use super::{Admission, DiscoverySet, FanOut, IdRewriter, IdSet, MergeError, MergePhase, PhaseTally};
use crate::{dataset::Dataset, model::Route};

/// tests whether a secondary route has no equivalent among the priority
/// routes.
///
/// routes are equivalent when their short names are exactly equal (case and
/// whitespace included); identifiers are ignored. a route without a short
/// name has no deduplication key and is always novel.
pub fn is_novel_route(route: &Route, priority_routes: &[Route]) -> bool {
    match &route.short_name {
        None => true,
        Some(short_name) => !priority_routes
            .iter()
            .any(|p| p.short_name.as_ref() == Some(short_name)),
    }
}

/// admits a novel secondary route with its identifier and agency reference
/// rewritten.
pub fn admit_route(route: Route, priority_routes: &[Route], rw: &IdRewriter) -> Admission<Route> {
    if !is_novel_route(&route, priority_routes) {
        return Admission::DroppedNotReferenced;
    }
    Admission::Included(Route {
        id: rw.id(route.id),
        agency: rw.opt_id(route.agency),
        ..route
    })
}

/// route phase. novelty is decided against the destination routes as they
/// stand when each secondary route is examined, so a secondary route whose
/// short name was already merged by an earlier secondary route is dropped.
/// returns the set of retained (rewritten) route ids.
pub fn merge_routes(
    fan_out: &FanOut,
    destination: &Dataset,
    secondary: &Dataset,
    rw: &IdRewriter,
) -> Result<(PhaseTally, IdSet), MergeError> {
    let mut known_routes = destination.routes().values();
    let retained = DiscoverySet::new();
    let tally = fan_out.sequential(MergePhase::Routes, secondary.routes().values(), |route| {
        match admit_route(route, &known_routes, rw) {
            Admission::Included(route) => {
                log::debug!(
                    "route {} ({}) is new, merging",
                    route.id,
                    route.short_name.as_deref().unwrap_or_default()
                );
                retained.add(route.id.clone());
                destination.insert(route.clone())?;
                known_routes.push(route);
                Ok(Admission::Included(()))
            }
            Admission::DroppedNotReferenced => Ok(Admission::DroppedNotReferenced),
        }
    })?;
    Ok((tally, retained.freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::test_fixtures::route;
    use crate::model::FeedId;

    #[test]
    fn test_matching_short_name_is_not_novel() {
        let priority = vec![route("P", "R1", "AG", "10")];
        assert!(!is_novel_route(&route("S", "R2", "AG", "10"), &priority));
        assert!(is_novel_route(&route("S", "R3", "AG", "20"), &priority));
    }

    #[test]
    fn test_identifier_equality_is_irrelevant() {
        let priority = vec![route("P", "R1", "AG", "10")];
        // same id, different short name: still novel
        assert!(is_novel_route(&route("P", "R1", "AG", "11"), &priority));
    }

    #[test]
    fn test_short_name_match_is_exact() {
        let priority = vec![route("P", "R1", "AG", "10A")];
        assert!(is_novel_route(&route("S", "R2", "AG", "10a"), &priority));
        assert!(is_novel_route(&route("S", "R3", "AG", " 10A"), &priority));
    }

    #[test]
    fn test_missing_short_name_is_novel() {
        let mut unnamed = route("P", "R1", "AG", "");
        unnamed.short_name = None;
        let priority = vec![unnamed.clone()];
        assert!(is_novel_route(&unnamed, &priority));
    }

    #[test]
    fn test_admit_route_rewrites_id_and_agency() {
        let rw = IdRewriter::default();
        let result = admit_route(route("S", "R3", "AG", "20"), &[], &rw)
            .included()
            .unwrap();
        assert_eq!(result.id, rw.id(FeedId::original("S", "R3")));
        assert_eq!(result.agency, Some(rw.id(FeedId::original("S", "AG"))));
        assert_eq!(result.short_name.as_deref(), Some("20"));
    }

    #[test]
    fn test_merged_short_name_shadows_later_secondary_route() {
        let fan_out = FanOut::new(1, false).unwrap();
        let destination = Dataset::new("priority");
        let secondary = Dataset::new("secondary");
        secondary.insert(route("S", "R2", "AG", "20")).unwrap();
        secondary.insert(route("S", "R3", "AG", "20")).unwrap();
        let rw = IdRewriter::default();
        let (tally, retained) = merge_routes(&fan_out, &destination, &secondary, &rw).unwrap();
        assert_eq!(
            tally,
            PhaseTally {
                included: 1,
                dropped: 1
            }
        );
        assert_eq!(retained.len(), 1);
        assert!(retained.contains(&rw.id(FeedId::original("S", "R2"))));
        let routes = destination.routes().values();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, rw.id(FeedId::original("S", "R2")));
    }

    #[test]
    fn test_unnamed_secondary_routes_are_all_merged() {
        let fan_out = FanOut::new(1, false).unwrap();
        let destination = Dataset::new("priority");
        let secondary = Dataset::new("secondary");
        for id in ["R2", "R3"] {
            let mut unnamed = route("S", id, "AG", "");
            unnamed.short_name = None;
            secondary.insert(unnamed).unwrap();
        }
        let (tally, _) =
            merge_routes(&fan_out, &destination, &secondary, &IdRewriter::default()).unwrap();
        assert_eq!(tally.included, 2);
        assert_eq!(destination.routes().len(), 2);
    }
}
