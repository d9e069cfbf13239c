use super::{CompletionOutcome, PreemptionReason, Process, ReadyQueue, SchedulingPolicy};
use tracing::{debug, warn};

/// Processes without a period sort behind every periodic one.
fn period_key(process: &Process) -> f64 {
    process.period().unwrap_or(f64::INFINITY)
}

/// Rate-monotonic: the shortest period has the highest priority.
///
/// Periodic processes are recycled on completion until they have run as many
/// times as their period bound allows; overrunning the bound is a miss.
#[derive(Debug, Default)]
pub struct RateMonotonic {
    ready: ReadyQueue,
}

impl RateMonotonic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for RateMonotonic {
    fn name(&self) -> &'static str {
        "Rate Monotonic"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        self.ready.position_min_by_key(period_key)
    }

    fn process_completion(&mut self, process: &mut Process) -> CompletionOutcome {
        let Some(period) = process.period() else {
            return CompletionOutcome::Done;
        };

        let executions = f64::from(process.executions());
        if executions > period {
            warn!(
                pid = process.pid(),
                executions = process.executions(),
                period,
                "Deadline miss: period bound exceeded"
            );
            CompletionOutcome::Missed
        } else if executions < period {
            process.recycle();
            debug!(
                pid = process.pid(),
                executions = process.executions(),
                "Periodic process rearmed"
            );
            CompletionOutcome::Continue
        } else {
            debug!(pid = process.pid(), "Periodic process finished all executions");
            CompletionOutcome::Done
        }
    }

    fn preemption_reason(&self, running: &Process) -> Option<PreemptionReason> {
        let shortest = self.ready.min_key(period_key)?;
        (shortest < period_key(running)).then_some(PreemptionReason::PeriodPriority)
    }
}
