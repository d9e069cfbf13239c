use super::{PreemptionReason, Process, ReadyQueue, SchedulingPolicy};

fn priority_key(process: &Process) -> f64 {
    f64::from(process.priority())
}

/// Lowest priority number runs first; a running process is never interrupted.
#[derive(Debug, Default)]
pub struct PriorityNonPreemptive {
    ready: ReadyQueue,
}

impl PriorityNonPreemptive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for PriorityNonPreemptive {
    fn name(&self) -> &'static str {
        "Priority (Non-Preemptive)"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        self.ready.position_min_by_key(priority_key)
    }
}

/// Lowest priority number runs first and displaces a strictly less urgent running process.
#[derive(Debug, Default)]
pub struct PriorityPreemptive {
    ready: ReadyQueue,
}

impl PriorityPreemptive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for PriorityPreemptive {
    fn name(&self) -> &'static str {
        "Priority (Preemptive)"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        self.ready.position_min_by_key(priority_key)
    }

    fn preemption_reason(&self, running: &Process) -> Option<PreemptionReason> {
        let best = self.ready.min_key(priority_key)?;
        (best < priority_key(running)).then_some(PreemptionReason::Priority)
    }
}
