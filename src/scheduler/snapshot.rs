use super::{Metrics, Process, SimTime};
use std::sync::mpsc::Sender;

/// One point of the completed-over-time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionPoint {
    pub time: SimTime,
    pub completed: usize,
}

/// Immutable copy of the engine state at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: SimTime,
    pub algorithm: &'static str,
    pub ready: Vec<Process>,
    pub running: Option<Process>,
    pub completed: Vec<Process>,
    pub deadline_misses: usize,
    pub process_switch_count: u64,
    /// Points recorded since the previous snapshot.
    pub completion_points: Vec<CompletionPoint>,
    pub metrics: Metrics,
    pub finished: bool,
}

/// Receives snapshots from the engine. Implementations must not block.
pub trait SnapshotObserver: Send {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

impl SnapshotObserver for Sender<Snapshot> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        // A hung-up receiver only means nobody is watching anymore.
        let _ = self.send(snapshot.clone());
    }
}
