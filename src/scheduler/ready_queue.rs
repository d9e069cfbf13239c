use super::{Pid, Process};
use std::collections::VecDeque;

/// Insertion-ordered set of READY processes owned by a policy.
#[derive(Debug, Default, Clone)]
pub struct ReadyQueue {
    processes: VecDeque<Process>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, process: Process) {
        debug_assert!(
            !self.contains(process.pid()),
            "process {} queued twice",
            process.pid()
        );
        self.processes.push_back(process);
    }

    pub fn pop_front(&mut self) -> Option<Process> {
        self.processes.pop_front()
    }

    pub fn get(&self, index: usize) -> Option<&Process> {
        self.processes.get(index)
    }

    pub fn remove_pid(&mut self, pid: Pid) -> Option<Process> {
        let index = self.processes.iter().position(|p| p.pid() == pid)?;
        self.processes.remove(index)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.iter().any(|p| p.pid() == pid)
    }

    /// Index of the process with the smallest key; the earliest one wins ties.
    pub fn position_min_by_key<F>(&self, key: F) -> Option<usize>
    where
        F: Fn(&Process) -> f64,
    {
        let mut best: Option<(usize, f64)> = None;
        for (index, process) in self.processes.iter().enumerate() {
            let value = key(process);
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some((index, value)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Smallest key among queued processes.
    pub fn min_key<F>(&self, key: F) -> Option<f64>
    where
        F: Fn(&Process) -> f64,
    {
        self.position_min_by_key(&key)
            .and_then(|index| self.get(index))
            .map(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
