use super::{Process, SimTime};

/// Aggregate performance figures over the processes retired so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub completed: usize,
    pub deadline_misses: usize,
    pub average_turnaround: SimTime,
    pub average_waiting: SimTime,
    pub average_response: SimTime,
    /// Completed processes per time unit.
    pub throughput: f64,
}

impl Metrics {
    pub fn from_processes(completed: &[Process], deadline_misses: usize, elapsed: SimTime) -> Self {
        let count = completed.len();
        if count == 0 {
            return Self {
                deadline_misses,
                ..Self::default()
            };
        }

        let n = count as f64;
        let average = |value: fn(&Process) -> SimTime| completed.iter().map(value).sum::<f64>() / n;

        Self {
            completed: count,
            deadline_misses,
            average_turnaround: average(Process::turnaround_time),
            average_waiting: average(Process::waiting_time),
            average_response: average(|p| p.response_time().unwrap_or(0.0)),
            throughput: if elapsed > 0.0 { n / elapsed } else { 0.0 },
        }
    }
}
