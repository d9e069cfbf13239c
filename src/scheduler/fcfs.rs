use super::{ReadyQueue, SchedulingPolicy};

/// First come, first served: the oldest ready process runs to completion.
#[derive(Debug, Default)]
pub struct Fcfs {
    ready: ReadyQueue,
}

impl Fcfs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for Fcfs {
    fn name(&self) -> &'static str {
        "First Come First Served"
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
}
