use super::{MergePhase, PhaseTally};
use std::{fmt::Display, time::Duration};

/// outcome of one completed (or skipped) merge phase.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseReport {
    pub phase: MergePhase,
    pub included: usize,
    pub dropped: usize,
    pub elapsed: Duration,
    pub skipped: bool,
}

impl PhaseReport {
    pub fn new(phase: MergePhase, tally: PhaseTally, elapsed: Duration) -> PhaseReport {
        PhaseReport {
            phase,
            included: tally.included,
            dropped: tally.dropped,
            elapsed,
            skipped: false,
        }
    }

    pub fn skipped(phase: MergePhase) -> PhaseReport {
        PhaseReport {
            phase,
            included: 0,
            dropped: 0,
            elapsed: Duration::ZERO,
            skipped: true,
        }
    }
}

impl Display for PhaseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.skipped { "skipped" } else { "merged" };
        write!(
            f,
            "{},{},{},{},{}",
            self.phase,
            status,
            self.included,
            self.dropped,
            self.elapsed.as_millis()
        )
    }
}

/// per-phase report of a full merge, in phase order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeSummary {
    pub priority: String,
    pub secondary: String,
    pub reports: Vec<PhaseReport>,
}

impl MergeSummary {
    pub fn new(priority: &str, secondary: &str) -> MergeSummary {
        MergeSummary {
            priority: priority.to_string(),
            secondary: secondary.to_string(),
            reports: vec![],
        }
    }

    pub fn report(&self, phase: MergePhase) -> Option<&PhaseReport> {
        self.reports.iter().find(|r| r.phase == phase)
    }

    pub fn total_included(&self) -> usize {
        self.reports.iter().map(|r| r.included).sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.reports.iter().map(|r| r.dropped).sum()
    }
}

impl Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "merge of '{}' into '{}'", self.secondary, self.priority)?;
        writeln!(f, "phase,status,included,dropped,elapsed_ms")?;
        for report in self.reports.iter() {
            writeln!(f, "{report}")?;
        }
        write!(
            f,
            "total,,{},{},",
            self.total_included(),
            self.total_dropped()
        )
    }
}
