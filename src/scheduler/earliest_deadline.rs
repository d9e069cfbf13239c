use super::{CompletionOutcome, PreemptionReason, Process, ReadyQueue, SchedulingPolicy};
use tracing::{debug, warn};

/// Processes without a deadline sort behind every deadline-bound one.
fn deadline_key(process: &Process) -> f64 {
    process.deadline().unwrap_or(f64::INFINITY)
}

/// Earliest deadline first over absolute deadlines.
#[derive(Debug, Default)]
pub struct EarliestDeadline {
    ready: ReadyQueue,
}

impl EarliestDeadline {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for EarliestDeadline {
    fn name(&self) -> &'static str {
        "Earliest Deadline First"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        self.ready.position_min_by_key(deadline_key)
    }

    fn process_completion(&mut self, process: &mut Process) -> CompletionOutcome {
        match (process.completion_time(), process.deadline()) {
            (Some(completed_at), Some(deadline)) if completed_at > deadline => {
                warn!(
                    pid = process.pid(),
                    completed_at,
                    deadline,
                    "Deadline miss"
                );
                CompletionOutcome::Missed
            }
            _ => {
                debug!(pid = process.pid(), "Process completed before its deadline");
                CompletionOutcome::Done
            }
        }
    }

    fn preemption_reason(&self, running: &Process) -> Option<PreemptionReason> {
        let earliest = self.ready.min_key(deadline_key)?;
        (earliest < deadline_key(running)).then_some(PreemptionReason::EarlierDeadline)
    }
}
