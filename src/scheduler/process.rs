use std::fmt;

/// Simulated time, in abstract time units.
pub type SimTime = f64;

pub type Pid = u32;

/// Remaining work below this is treated as exhausted.
pub const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Ready,
    Running,
    Completed,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessStatus::Ready => "READY",
            ProcessStatus::Running => "RUNNING",
            ProcessStatus::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pid: Pid,
    arrival_time: SimTime,
    burst_time: SimTime,
    remaining_time: SimTime,
    priority: i32,
    period: Option<SimTime>,
    deadline: Option<SimTime>,
    time_in_current_quantum: SimTime,
    status: ProcessStatus,
    start_time: Option<SimTime>,
    completion_time: Option<SimTime>,
    turnaround_time: SimTime,
    waiting_time: SimTime,
    executions: u32,
}

impl Process {
    pub fn new(pid: Pid, arrival_time: SimTime, burst_time: SimTime, priority: i32) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            priority,
            period: None,
            deadline: None,
            time_in_current_quantum: 0.0,
            status: ProcessStatus::Ready,
            start_time: None,
            completion_time: None,
            turnaround_time: 0.0,
            waiting_time: 0.0,
            executions: 0,
        }
    }

    pub fn with_period(mut self, period: SimTime) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_deadline(mut self, deadline: SimTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn burst_time(&self) -> SimTime {
        self.burst_time
    }

    pub fn remaining_time(&self) -> SimTime {
        self.remaining_time
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn period(&self) -> Option<SimTime> {
        self.period
    }

    pub fn deadline(&self) -> Option<SimTime> {
        self.deadline
    }

    pub fn time_in_current_quantum(&self) -> SimTime {
        self.time_in_current_quantum
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<SimTime> {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<SimTime> {
        self.completion_time
    }

    pub fn turnaround_time(&self) -> SimTime {
        self.turnaround_time
    }

    pub fn waiting_time(&self) -> SimTime {
        self.waiting_time
    }

    /// Number of periodic executions already finished (rate-monotonic only).
    pub fn executions(&self) -> u32 {
        self.executions
    }

    /// Time between arrival and first dispatch.
    pub fn response_time(&self) -> Option<SimTime> {
        self.start_time.map(|start| start - self.arrival_time)
    }

    pub fn is_completed(&self) -> bool {
        self.remaining_time <= 0.0
    }

    /// Runs the process for up to `quantum` time units and returns the time actually used.
    pub fn execute(&mut self, quantum: SimTime) -> SimTime {
        debug_assert_ne!(self.status, ProcessStatus::Completed, "executing a completed process");

        let time_used = quantum.min(self.remaining_time);
        self.remaining_time -= time_used;
        self.time_in_current_quantum += time_used;
        debug_assert!(self.remaining_time > -TIME_EPSILON);

        if self.remaining_time <= TIME_EPSILON {
            self.remaining_time = 0.0;
            self.status = ProcessStatus::Completed;
        }
        time_used
    }

    pub(crate) fn mark_running(&mut self, now: SimTime) {
        debug_assert_eq!(self.status, ProcessStatus::Ready);
        self.status = ProcessStatus::Running;
        self.start_time.get_or_insert(now);
    }

    pub(crate) fn mark_preempted(&mut self) {
        debug_assert_eq!(self.status, ProcessStatus::Running);
        self.status = ProcessStatus::Ready;
        self.time_in_current_quantum = 0.0;
    }

    pub(crate) fn record_completion(&mut self, now: SimTime) {
        debug_assert_eq!(self.remaining_time, 0.0);
        self.completion_time = Some(now);
        self.turnaround_time = now - self.arrival_time;
        self.waiting_time = self.turnaround_time - self.burst_time;
    }

    /// Rearms a periodic process for its next execution.
    pub(crate) fn recycle(&mut self) {
        self.executions += 1;
        self.remaining_time = self.burst_time;
        self.time_in_current_quantum = 0.0;
        self.status = ProcessStatus::Ready;
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process {}: arrival={}, burst={}, priority={}",
            self.pid, self.arrival_time, self.burst_time, self.priority
        )
    }
}
