mod clock;
mod display;
mod earliest_deadline;
mod engine;
mod factory;
mod fcfs;
mod metrics;
mod priority;
mod process;
mod rate_monotonic;
mod ready_queue;
mod round_robin;
mod runner;
mod shortest_job;
mod snapshot;

use std::fmt;
use tracing::debug;

pub use clock::{ClockDriver, DriverCommand, Pacing};
pub use earliest_deadline::EarliestDeadline;
pub use engine::{SchedulerEngine, SimulationReport};
pub use factory::{create_policy, Algorithm};
pub use fcfs::Fcfs;
pub use metrics::Metrics;
pub use priority::{PriorityNonPreemptive, PriorityPreemptive};
pub use process::{Pid, Process, ProcessStatus, SimTime, TIME_EPSILON};
pub use rate_monotonic::RateMonotonic;
pub use ready_queue::ReadyQueue;
pub use round_robin::RoundRobin;
pub use runner::{ProcessRunner, RunnerEvent, SimulationHandle};
pub use shortest_job::ShortestJob;
pub use snapshot::{CompletionPoint, Snapshot, SnapshotObserver};

/// Result of handing a finished process back to its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Finished on time; the process is retired into the completed set.
    Done,
    /// A periodic task with executions left; the policy rearmed it for requeueing.
    Continue,
    /// Finished after its deadline or period bound; dropped and reported as a miss.
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreemptionReason {
    Quantum,
    Priority,
    PeriodPriority,
    EarlierDeadline,
}

impl fmt::Display for PreemptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PreemptionReason::Quantum => "quantum",
            PreemptionReason::Priority => "priority",
            PreemptionReason::PeriodPriority => "period priority",
            PreemptionReason::EarlierDeadline => "earlier deadline",
        };
        f.write_str(reason)
    }
}

/// Selection contract shared by every scheduling algorithm.
///
/// The policy owns the ready set. The running process lives in the engine
/// between `dispatch` and its completion or preemption.
pub trait SchedulingPolicy: Send {
    fn name(&self) -> &'static str;

    fn ready(&self) -> &ReadyQueue;

    fn ready_mut(&mut self) -> &mut ReadyQueue;

    /// Position in the ready set of the process that should run next.
    fn select(&self) -> Option<usize>;

    /// The process that would run next. Has no side effects.
    fn schedule(&self) -> Option<&Process> {
        self.select().and_then(|index| self.ready().get(index))
    }

    /// Removes the selected process from the ready set and hands it to the engine.
    fn dispatch(&mut self) -> Option<Process> {
        let pid = self.schedule()?.pid();
        self.ready_mut().remove_pid(pid)
    }

    fn process_arrival(&mut self, process: Process) {
        debug!(policy = self.name(), pid = process.pid(), "Process arrived");
        self.ready_mut().push(process);
    }

    /// Decides the fate of a process whose remaining time reached zero.
    fn process_completion(&mut self, process: &mut Process) -> CompletionOutcome {
        debug!(policy = self.name(), pid = process.pid(), "Process completed");
        CompletionOutcome::Done
    }

    fn process_preemption(&mut self, process: &Process, reason: PreemptionReason) {
        debug!(
            policy = self.name(),
            pid = process.pid(),
            %reason,
            "Process preempted"
        );
    }

    /// Whether the just-executed process must give up the CPU.
    fn preemption_reason(&self, _running: &Process) -> Option<PreemptionReason> {
        None
    }

    /// Puts a preempted or rearmed process back at the tail of the ready set.
    fn requeue(&mut self, process: Process) {
        self.ready_mut().push(process);
    }

    fn has_ready(&self) -> bool {
        !self.ready().is_empty()
    }
}
