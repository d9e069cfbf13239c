use super::{PreemptionReason, Process, ReadyQueue, SchedulingPolicy, SimTime, TIME_EPSILON};

/// Strict FIFO rotation. The head is dispatched and a process returns to the
/// tail only when its quantum expires.
#[derive(Debug)]
pub struct RoundRobin {
    ready: ReadyQueue,
    time_quantum: SimTime,
}

impl RoundRobin {
    /// `time_quantum` must be positive; the factory rejects anything else.
    pub fn new(time_quantum: SimTime) -> Self {
        debug_assert!(time_quantum > 0.0);
        Self {
            ready: ReadyQueue::new(),
            time_quantum,
        }
    }
}

impl SchedulingPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "Round Robin"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        (!self.ready.is_empty()).then_some(0)
    }

    fn dispatch(&mut self) -> Option<Process> {
        self.ready.pop_front()
    }

    fn preemption_reason(&self, running: &Process) -> Option<PreemptionReason> {
        (running.time_in_current_quantum() >= self.time_quantum - TIME_EPSILON)
            .then_some(PreemptionReason::Quantum)
    }
}
