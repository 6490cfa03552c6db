use super::{Admission, ElementFailure, MergeError, MergePhase};
use crate::model::FeedEntity;
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::{
    any::Any,
    ops::Add,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

/// counts of rows admitted and dropped by one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTally {
    pub included: usize,
    pub dropped: usize,
}

impl Add for PhaseTally {
    type Output = PhaseTally;

    fn add(self, rhs: Self) -> Self::Output {
        PhaseTally {
            included: self.included + rhs.included,
            dropped: self.dropped + rhs.dropped,
        }
    }
}

/// runs the per-row tasks of a phase, either on a fixed-size worker pool or
/// on the calling thread.
///
/// both forms return only after every task finished, which is the barrier
/// between phases. failures of individual tasks, including panics, are
/// collected and reported together as [`MergeError::PhaseFailed`].
pub struct FanOut {
    pool: rayon::ThreadPool,
    show_progress: bool,
}

impl FanOut {
    pub fn new(parallelism: usize, show_progress: bool) -> Result<FanOut, MergeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|idx| format!("gtfs-merge-{idx}"))
            .build()
            .map_err(|e| MergeError::WorkerPoolError(e.to_string()))?;
        Ok(FanOut {
            pool,
            show_progress,
        })
    }

    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// runs `task` for every row on the worker pool and returns the admitted
    /// values in the order of `rows`, whatever order the tasks finished in.
    pub fn parallel<T, U, F>(
        &self,
        phase: MergePhase,
        rows: Vec<T>,
        task: F,
    ) -> Result<(PhaseTally, Vec<U>), MergeError>
    where
        T: FeedEntity,
        U: Send,
        F: Fn(T) -> Result<Admission<U>, MergeError> + Send + Sync,
    {
        let bar = self.progress_bar(phase, rows.len())?;
        let outcomes: Vec<Result<Admission<U>, ElementFailure>> = self.pool.install(|| {
            rows.into_par_iter()
                .map(|row| {
                    let element = row.key();
                    let result = run_guarded(&task, row);
                    if let Some(bar) = &bar {
                        if let Ok(mut bar) = bar.lock() {
                            let _ = bar.update(1);
                        }
                    }
                    result.map_err(|message| ElementFailure {
                        phase,
                        element: element.to_string(),
                        message,
                    })
                })
                .collect()
        });
        if bar.is_some() {
            eprintln!();
        }
        tally(phase, outcomes)
    }

    /// runs `task` for every row in order on the calling thread.
    pub fn sequential<T, F>(
        &self,
        phase: MergePhase,
        rows: Vec<T>,
        mut task: F,
    ) -> Result<PhaseTally, MergeError>
    where
        T: FeedEntity,
        F: FnMut(T) -> Result<Admission<()>, MergeError>,
    {
        let outcomes = rows
            .into_iter()
            .map(|row| {
                let element = row.key();
                run_guarded(&mut task, row).map_err(|message| ElementFailure {
                    phase,
                    element: element.to_string(),
                    message,
                })
            })
            .collect::<Vec<_>>();
        tally(phase, outcomes).map(|(tally, _)| tally)
    }

    fn progress_bar(
        &self,
        phase: MergePhase,
        total: usize,
    ) -> Result<Option<Arc<Mutex<Bar>>>, MergeError> {
        if !self.show_progress {
            return Ok(None);
        }
        let bar = Bar::builder()
            .desc(format!("merge {phase}"))
            .total(total)
            .build()
            .map_err(|e| MergeError::ProgressBarError(e.to_string()))?;
        Ok(Some(Arc::new(Mutex::new(bar))))
    }
}

/// runs one task, turning both errors and panics into a failure message.
fn run_guarded<T, U, F>(task: F, row: T) -> Result<Admission<U>, String>
where
    F: FnOnce(T) -> Result<Admission<U>, MergeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| task(row))) {
        Ok(Ok(admission)) => Ok(admission),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("task panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("unknown panic payload")
    }
}

fn tally<U>(
    phase: MergePhase,
    outcomes: Vec<Result<Admission<U>, ElementFailure>>,
) -> Result<(PhaseTally, Vec<U>), MergeError> {
    let mut result = PhaseTally::default();
    let mut admitted = vec![];
    let mut failures = vec![];
    for outcome in outcomes {
        match outcome {
            Ok(Admission::Included(value)) => {
                result.included += 1;
                admitted.push(value);
            }
            Ok(Admission::DroppedNotReferenced) => result.dropped += 1,
            Err(failure) => failures.push(failure),
        }
    }
    if failures.is_empty() {
        Ok((result, admitted))
    } else {
        Err(MergeError::PhaseFailed { phase, failures })
    }
}
