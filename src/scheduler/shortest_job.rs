use super::{ReadyQueue, SchedulingPolicy};

/// Non-preemptive shortest job first, keyed on total burst time.
#[derive(Debug, Default)]
pub struct ShortestJob {
    ready: ReadyQueue,
}

impl ShortestJob {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for ShortestJob {
    fn name(&self) -> &'static str {
        "Shortest Job First"
    }

    fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    fn ready_mut(&mut self) -> &mut ReadyQueue {
        &mut self.ready
    }

    fn select(&self) -> Option<usize> {
        self.ready.position_min_by_key(|p| p.burst_time())
    }
}
