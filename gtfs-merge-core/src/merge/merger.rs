use super::{
    phase_ops, route_novelty, FanOut, IdRewriter, MergeConfig, MergeError, MergePhase,
    MergeSummary, PhaseReport, PhaseTally,
};
use crate::dataset::Dataset;
use std::time::Instant;

/// merges the routes of a secondary dataset that are missing from a priority
/// dataset, along with everything those routes depend on.
///
/// phases run in the order of [`MergePhase::ALL`]. each phase receives the
/// ids discovered by the phases before it and finishes completely before the
/// next one starts.
pub struct GtfsMerger {
    config: MergeConfig,
    rewriter: IdRewriter,
    fan_out: FanOut,
}

impl GtfsMerger {
    pub fn new(config: MergeConfig) -> Result<GtfsMerger, MergeError> {
        config.validate()?;
        let rewriter = IdRewriter::new(config.id_marker(), config.offset());
        let fan_out = FanOut::new(config.parallelism, config.show_progress)?;
        Ok(GtfsMerger {
            config,
            rewriter,
            fan_out,
        })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// merges `secondary` into `priority`, returning the merged dataset.
    ///
    /// `priority` is consumed since it becomes the destination. `secondary`
    /// is only read. on error the partially merged dataset is discarded.
    pub fn merge(
        &self,
        priority: Dataset,
        secondary: &Dataset,
    ) -> Result<(Dataset, MergeSummary), MergeError> {
        let summary = self.merge_into(&priority, secondary)?;
        Ok((priority, summary))
    }

    /// merges `secondary` into `destination` in place. when this fails,
    /// `destination` may hold a partial merge and should not be used.
    pub fn merge_into(
        &self,
        destination: &Dataset,
        secondary: &Dataset,
    ) -> Result<MergeSummary, MergeError> {
        if self.config.validate_surrogate_offset {
            self.check_surrogate_offset(destination)?;
        }
        let timezone = self.normalized_timezone(destination);
        let fan_out = &self.fan_out;
        let rw = &self.rewriter;
        let mut summary = MergeSummary::new(&destination.name, &secondary.name);
        log::info!(
            "merging '{}' into '{}' with {} worker(s)",
            secondary.name,
            destination.name,
            fan_out.parallelism()
        );

        let start = Instant::now();
        let tally =
            phase_ops::merge_agencies(fan_out, destination, secondary, timezone.as_deref(), rw)?;
        summary.reports.push(report(MergePhase::Agencies, tally, start));

        let start = Instant::now();
        let (tally, routes) = route_novelty::merge_routes(fan_out, destination, secondary, rw)?;
        summary.reports.push(report(MergePhase::Routes, tally, start));

        let start = Instant::now();
        let (tally, discovered) =
            phase_ops::merge_trips(fan_out, destination, secondary, &routes, rw)?;
        summary.reports.push(report(MergePhase::Trips, tally, start));

        let start = Instant::now();
        let (tally, stops) =
            phase_ops::merge_stop_times(fan_out, destination, secondary, &discovered.trips, rw)?;
        summary.reports.push(report(MergePhase::StopTimes, tally, start));

        let start = Instant::now();
        let tally = phase_ops::merge_stops(fan_out, destination, secondary, &stops, rw)?;
        summary.reports.push(report(MergePhase::Stops, tally, start));

        let start = Instant::now();
        let tally = phase_ops::merge_shape_points(
            fan_out,
            destination,
            secondary,
            &discovered.shapes,
            rw,
        )?;
        summary.reports.push(report(MergePhase::ShapePoints, tally, start));

        let start = Instant::now();
        let tally = phase_ops::merge_calendars(
            fan_out,
            destination,
            secondary,
            &discovered.services,
            rw,
        )?;
        summary.reports.push(report(MergePhase::Calendars, tally, start));

        let start = Instant::now();
        let tally = phase_ops::merge_frequencies(
            fan_out,
            destination,
            secondary,
            &discovered.trips,
            rw,
        )?;
        summary.reports.push(report(MergePhase::Frequencies, tally, start));

        if self.config.include_fare_rules {
            let start = Instant::now();
            let tally =
                phase_ops::merge_fare_rules(fan_out, destination, secondary, &routes, rw)?;
            summary.reports.push(report(MergePhase::FareRules, tally, start));
        } else {
            log::info!("fare rules disabled, skipping phase '{}'", MergePhase::FareRules);
            summary.reports.push(PhaseReport::skipped(MergePhase::FareRules));
        }

        log::info!(
            "merge complete: {} row(s) added, {} row(s) dropped",
            summary.total_included(),
            summary.total_dropped()
        );
        Ok(summary)
    }

    /// copied surrogate keys are the secondary key plus the offset, so every
    /// priority key has to stay below the offset.
    fn check_surrogate_offset(&self, destination: &Dataset) -> Result<(), MergeError> {
        let offset = self.config.offset();
        match destination
            .max_surrogate_keys()
            .into_iter()
            .find(|(_, key)| key.0 >= offset.0)
        {
            Some((table, max_key)) => Err(MergeError::SurrogateOffsetCollision {
                table,
                max_key,
                offset,
            }),
            None => Ok(()),
        }
    }

    fn normalized_timezone(&self, destination: &Dataset) -> Option<String> {
        self.config.normalized_timezone.clone().or_else(|| {
            destination
                .agencies()
                .values()
                .into_iter()
                .next()
                .map(|a| a.timezone)
        })
    }
}

/// merges `secondary` into `priority` with the default configuration.
pub fn merge(
    priority: Dataset,
    secondary: &Dataset,
) -> Result<(Dataset, MergeSummary), MergeError> {
    GtfsMerger::new(MergeConfig::default())?.merge(priority, secondary)
}

fn report(phase: MergePhase, tally: PhaseTally, start: Instant) -> PhaseReport {
    let report = PhaseReport::new(phase, tally, start.elapsed());
    let mode = if phase.is_parallel() {
        "parallel"
    } else {
        "sequential"
    };
    log::info!(
        "{} phase '{}' included {} and dropped {} row(s) in {:?}",
        mode,
        phase,
        report.included,
        report.dropped,
        report.elapsed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::test_fixtures::*;
    use crate::model::{FeedId, SurrogateKey};

    const P: &str = "P";
    const S: &str = "S";
    const DEFAULT_OFFSET: u64 = crate::model::DEFAULT_SURROGATE_OFFSET;

    fn merger() -> GtfsMerger {
        GtfsMerger::new(MergeConfig {
            parallelism: 2,
            ..Default::default()
        })
        .unwrap()
    }

    fn rewritten(local: &str) -> FeedId {
        FeedId::original(S, local).rewrite(&Default::default())
    }

    /// priority has route R1 "10"; secondary has R2 "10" and R3 "20", each
    /// with one trip, stop times, a shape and a calendar.
    fn scenario() -> (Dataset, Dataset) {
        let priority = Dataset::new("priority");
        priority.insert(agency(P, "AG", "Europe/Rome")).unwrap();
        priority.insert(route(P, "R1", "AG", "10")).unwrap();
        priority.insert(trip(P, "T1", "R1", "WK", None)).unwrap();
        priority.insert(stop(P, "A")).unwrap();
        priority.insert(stop_time(1, P, "T1", "A", 1)).unwrap();
        priority.insert(calendar(1, P, "WK")).unwrap();

        let secondary = Dataset::new("secondary");
        secondary.insert(agency(S, "AG", "Europe/Paris")).unwrap();
        secondary.insert(route(S, "R2", "AG", "10")).unwrap();
        secondary.insert(route(S, "R3", "AG", "20")).unwrap();
        secondary.insert(trip(S, "T2", "R2", "WK", Some("SH2"))).unwrap();
        secondary.insert(trip(S, "T3", "R3", "WK", Some("SH3"))).unwrap();
        secondary.insert(stop(S, "A")).unwrap();
        secondary.insert(stop(S, "B")).unwrap();
        secondary.insert(stop(S, "C")).unwrap();
        secondary.insert(stop(S, "UNUSED")).unwrap();
        secondary.insert(stop_time(1, S, "T2", "A", 1)).unwrap();
        secondary.insert(stop_time(2, S, "T2", "B", 2)).unwrap();
        secondary.insert(stop_time(3, S, "T3", "B", 1)).unwrap();
        secondary.insert(stop_time(4, S, "T3", "C", 2)).unwrap();
        secondary.insert(shape_point(1, S, "SH2", 1)).unwrap();
        secondary.insert(shape_point(2, S, "SH3", 1)).unwrap();
        secondary.insert(shape_point(3, S, "SH3", 2)).unwrap();
        secondary.insert(calendar(1, S, "WK")).unwrap();
        secondary.insert(calendar_date(2, S, "WK")).unwrap();
        secondary.insert(frequency(1, S, "T2")).unwrap();
        secondary.insert(frequency(2, S, "T3")).unwrap();
        secondary.insert(fare(S, "F1", "AG")).unwrap();
        secondary.insert(fare(S, "F2", "AG")).unwrap();
        secondary.insert(fare_rule(1, S, "F1", Some("R3"))).unwrap();
        secondary.insert(fare_rule(2, S, "F2", Some("R2"))).unwrap();
        secondary.insert(fare_rule(3, S, "F2", None)).unwrap();
        (priority, secondary)
    }

    #[test]
    fn test_only_novel_route_is_merged() {
        let (priority, secondary) = scenario();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();
        let routes = merged.routes();
        assert_eq!(routes.len(), 2);
        assert!(routes.contains(&FeedId::original(P, "R1")));
        assert!(routes.contains(&rewritten("R3")));
        assert!(!routes.contains(&rewritten("R2")));
        assert!(!routes.contains(&FeedId::original(S, "R2")));
    }

    #[test]
    fn test_dependents_follow_retained_route() {
        let (priority, secondary) = scenario();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();

        assert!(merged.trips().contains(&rewritten("T3")));
        assert!(!merged.trips().contains(&rewritten("T2")));

        let offset = DEFAULT_OFFSET;
        let stop_times = merged.stop_times();
        assert_eq!(stop_times.len(), 3);
        assert!(stop_times.contains(&SurrogateKey(3 + offset)));
        assert!(stop_times.contains(&SurrogateKey(4 + offset)));
        assert!(!stop_times.contains(&SurrogateKey(1 + offset)));

        // B and C are reached through T3; A only through the dropped T2
        let stops = merged.stops();
        assert!(stops.contains(&rewritten("B")));
        assert!(stops.contains(&rewritten("C")));
        assert!(!stops.contains(&rewritten("A")));
        assert!(!stops.contains(&rewritten("UNUSED")));
        assert!(stops.contains(&FeedId::original(P, "A")));

        let shape_points = merged.shape_points();
        assert_eq!(shape_points.len(), 2);
        assert!(shape_points
            .values()
            .iter()
            .all(|p| p.shape == rewritten("SH3")));

        assert_eq!(merged.calendars().len(), 2);
        assert_eq!(merged.calendar_dates().len(), 1);

        // frequency of the dropped trip T2 is not copied
        let frequencies = merged.frequencies().values();
        assert_eq!(frequencies.len(), 1);
        assert_eq!(frequencies[0].trip, rewritten("T3"));
    }

    #[test]
    fn test_fare_rules_follow_retained_route() {
        let (priority, secondary) = scenario();
        let (merged, summary) = merger().merge(priority, &secondary).unwrap();
        let rules = merged.fare_rules().values();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].fare, rewritten("F1"));
        assert_eq!(rules[0].route, Some(rewritten("R3")));
        assert_eq!(merged.fares().len(), 1);
        assert!(merged.fares().contains(&rewritten("F1")));
        let report = summary.report(MergePhase::FareRules).unwrap();
        assert_eq!((report.included, report.dropped), (1, 2));
    }

    #[test]
    fn test_priority_rows_are_preserved() {
        let (priority, secondary) = scenario();
        let before = priority.clone();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();
        for trip in before.trips().values() {
            assert_eq!(merged.trips().get(&trip.id), Some(trip));
        }
        for route in before.routes().values() {
            assert_eq!(merged.routes().get(&route.id), Some(route));
        }
        for stop_time in before.stop_times().values() {
            assert_eq!(merged.stop_times().get(&stop_time.key), Some(stop_time));
        }
    }

    #[test]
    fn test_agencies_are_copied_and_timezone_normalized() {
        let (priority, secondary) = scenario();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();
        let agencies = merged.agencies().values();
        assert_eq!(agencies.len(), 2);
        assert!(agencies.iter().all(|a| a.timezone == "Europe/Rome"));
        assert!(merged.agencies().contains(&rewritten("AG")));
    }

    #[test]
    fn test_configured_timezone_overrides_priority() {
        let (priority, secondary) = scenario();
        let merger = GtfsMerger::new(MergeConfig {
            parallelism: 1,
            normalized_timezone: Some(String::from("UTC")),
            ..Default::default()
        })
        .unwrap();
        let (merged, _) = merger.merge(priority, &secondary).unwrap();
        assert!(merged.agencies().values().iter().all(|a| a.timezone == "UTC"));
    }

    #[test]
    fn test_no_rewritten_id_collides_with_priority() {
        // secondary reuses every priority identifier
        let (priority, secondary) = scenario();
        secondary.insert(route(S, "R1", "AG", "30")).unwrap();
        secondary.insert(trip(S, "T1", "R1", "WK", None)).unwrap();
        let priority_routes = priority.routes().len();
        let priority_trips = priority.trips().len();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();
        assert_eq!(merged.routes().len(), priority_routes + 2);
        assert_eq!(merged.trips().len(), priority_trips + 2);
        assert!(merged.trips().contains(&FeedId::original(P, "T1")));
        assert!(merged.trips().contains(&rewritten("T1")));
    }

    #[test]
    fn test_referential_closure() {
        let (priority, secondary) = scenario();
        let (merged, _) = merger().merge(priority, &secondary).unwrap();
        for trip in merged.trips().values() {
            assert!(merged.routes().contains(&trip.route));
        }
        for stop_time in merged.stop_times().values() {
            assert!(merged.trips().contains(&stop_time.trip));
            assert!(merged.stops().contains(&stop_time.stop));
        }
        for frequency in merged.frequencies().values() {
            assert!(merged.trips().contains(&frequency.trip));
        }
        for rule in merged.fare_rules().values() {
            assert!(merged.fares().contains(&rule.fare));
        }
    }

    #[test]
    fn test_summary_lists_every_phase_in_order() {
        let (priority, secondary) = scenario();
        let (_, summary) = merger().merge(priority, &secondary).unwrap();
        let phases = summary.reports.iter().map(|r| r.phase).collect::<Vec<_>>();
        assert_eq!(phases, MergePhase::ALL.to_vec());
        let routes = summary.report(MergePhase::Routes).unwrap();
        assert_eq!((routes.included, routes.dropped), (1, 1));
    }

    #[test]
    fn test_fare_rules_can_be_skipped() {
        let (priority, secondary) = scenario();
        let merger = GtfsMerger::new(MergeConfig {
            parallelism: 1,
            include_fare_rules: false,
            ..Default::default()
        })
        .unwrap();
        let (merged, summary) = merger.merge(priority, &secondary).unwrap();
        assert!(merged.fare_rules().is_empty());
        assert!(merged.fares().is_empty());
        assert!(summary.report(MergePhase::FareRules).unwrap().skipped);
    }

    #[test]
    fn test_surrogate_offset_collision_is_rejected() {
        let (priority, secondary) = scenario();
        priority
            .insert(stop_time(DEFAULT_OFFSET, P, "T1", "A", 2))
            .unwrap();
        let result = merger().merge(priority, &secondary);
        assert!(matches!(
            result,
            Err(MergeError::SurrogateOffsetCollision { table: "stop_times", .. })
        ));
    }

    #[test]
    fn test_duplicate_key_surfaces_as_phase_failure() {
        let (priority, secondary) = scenario();
        // pre-populate the rewritten id the trip phase will try to insert
        let mut existing = trip(S, "T3", "R3", "WK", None);
        existing.id = rewritten("T3");
        priority.insert(existing).unwrap();
        let result = merger().merge(priority, &secondary);
        match result {
            Err(MergeError::PhaseFailed { phase, failures }) => {
                assert_eq!(phase, MergePhase::Trips);
                assert_eq!(failures.len(), 1);
                assert!(failures[0].message.contains("trips"));
            }
            other => panic!("expected trip phase failure, found {other:?}"),
        }
    }

    #[test]
    fn test_empty_secondary_changes_nothing() {
        let (priority, _) = scenario();
        let before = priority.table_counts();
        let (merged, summary) = merge(priority, &Dataset::new("empty")).unwrap();
        assert_eq!(merged.table_counts(), before);
        assert_eq!(summary.total_included(), 0);
    }
}
