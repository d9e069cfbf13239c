use super::{
    create_policy, CompletionOutcome, CompletionPoint, Metrics, PreemptionReason, Process,
    SchedulingPolicy, SimTime, Snapshot, SnapshotObserver, TIME_EPSILON,
};
use crate::config::SimulationConfig;
use crate::error::{ensure_positive, ConfigResult};
use tracing::{debug, info, warn};

/// Final outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub algorithm: &'static str,
    pub completed: Vec<Process>,
    pub missed: Vec<Process>,
    pub process_switch_count: u64,
    pub elapsed: SimTime,
    pub metrics: Metrics,
    pub completion_series: Vec<CompletionPoint>,
}

/// Owns the running process and the retired sets, and advances them one tick at a time.
pub struct SchedulerEngine {
    policy: Box<dyn SchedulingPolicy>,
    tick: SimTime,
    current_time: SimTime,
    current: Option<Process>,
    completed: Vec<Process>,
    missed: Vec<Process>,
    process_switch_count: u64,
    completion_series: Vec<CompletionPoint>,
    published_points: usize,
    snapshot_interval: SimTime,
    since_snapshot: SimTime,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl SchedulerEngine {
    pub const DEFAULT_SNAPSHOT_INTERVAL: SimTime = 1.0;

    pub fn new(policy: Box<dyn SchedulingPolicy>, tick: SimTime) -> Self {
        debug_assert!(tick > 0.0, "tick must be positive");
        Self {
            policy,
            tick,
            current_time: 0.0,
            current: None,
            completed: Vec::new(),
            missed: Vec::new(),
            process_switch_count: 0,
            completion_series: Vec::new(),
            published_points: 0,
            snapshot_interval: Self::DEFAULT_SNAPSHOT_INTERVAL,
            since_snapshot: 0.0,
            observers: Vec::new(),
        }
    }

    /// Builds the engine for a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> ConfigResult<Self> {
        let tick = ensure_positive("tick", config.clock.tick)?;
        let interval = ensure_positive("snapshotInterval", config.clock.snapshot_interval)?;
        let policy = create_policy(&config.scheduling)?;
        Ok(Self::new(policy, tick).with_snapshot_interval(interval))
    }

    /// Minimum simulated time between two published snapshots.
    pub fn with_snapshot_interval(mut self, interval: SimTime) -> Self {
        debug_assert!(interval > 0.0);
        self.snapshot_interval = interval;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SnapshotObserver>) {
        self.observers.push(observer);
    }

    pub fn algorithm(&self) -> &'static str {
        self.policy.name()
    }

    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    pub fn process_switch_count(&self) -> u64 {
        self.process_switch_count
    }

    pub fn current_process(&self) -> Option<&Process> {
        self.current.as_ref()
    }

    pub fn ready_processes(&self) -> impl Iterator<Item = &Process> {
        self.policy.ready().iter()
    }

    pub fn completed(&self) -> &[Process] {
        &self.completed
    }

    pub fn missed(&self) -> &[Process] {
        &self.missed
    }

    pub fn completion_series(&self) -> &[CompletionPoint] {
        &self.completion_series
    }

    pub fn has_running_processes(&self) -> bool {
        self.current.is_some() || self.policy.has_ready()
    }

    pub fn receive_new_process(&mut self, process: Process) {
        debug_assert!(
            !self.completed.iter().any(|p| p.pid() == process.pid()),
            "process {} arrived after completing",
            process.pid()
        );
        debug!(pid = process.pid(), time = self.current_time, "New process received");

        self.policy.process_arrival(process);
        self.check_scheduling();
    }

    /// Advances the clock by one tick, runs the current process for that tick
    /// and applies completion or preemption before dispatching again.
    pub fn run_scheduling_cycle(&mut self) {
        self.current_time += self.tick;
        self.since_snapshot += self.tick;

        if let Some(mut process) = self.current.take() {
            process.execute(self.tick);

            if process.is_completed() {
                self.complete(process);
            } else if let Some(reason) = self.policy.preemption_reason(&process) {
                self.preempt(process, reason);
            } else {
                self.current = Some(process);
            }
        }

        self.check_scheduling();

        if self.since_snapshot >= self.snapshot_interval - TIME_EPSILON {
            self.since_snapshot = 0.0;
            self.publish(false);
        }
    }

    fn complete(&mut self, mut process: Process) {
        process.record_completion(self.current_time);

        match self.policy.process_completion(&mut process) {
            CompletionOutcome::Done => {
                info!(
                    pid = process.pid(),
                    time = self.current_time,
                    turnaround = process.turnaround_time(),
                    waiting = process.waiting_time(),
                    "Process completed"
                );
                self.completed.push(process);
                self.completion_series.push(CompletionPoint {
                    time: self.current_time,
                    completed: self.completed.len(),
                });
            }
            CompletionOutcome::Missed => {
                warn!(pid = process.pid(), time = self.current_time, "Process missed its deadline");
                self.missed.push(process);
            }
            CompletionOutcome::Continue => {
                self.policy.requeue(process);
            }
        }
    }

    fn preempt(&mut self, mut process: Process, reason: PreemptionReason) {
        process.mark_preempted();
        self.policy.process_preemption(&process, reason);
        self.policy.requeue(process);
    }

    fn check_scheduling(&mut self) {
        if self.current.is_some() {
            return;
        }

        if let Some(mut next) = self.policy.dispatch() {
            next.mark_running(self.current_time);
            self.process_switch_count += 1;
            debug!(pid = next.pid(), time = self.current_time, "Process dispatched");
            self.current = Some(next);
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::from_processes(&self.completed, self.missed.len(), self.current_time)
    }

    /// Current state. `finished` stays false here: the engine cannot see
    /// arrivals still pending in the driver, so only `publish(true)` ends a run.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.current_time,
            algorithm: self.policy.name(),
            ready: self.policy.ready().iter().cloned().collect(),
            running: self.current.clone(),
            completed: self.completed.clone(),
            deadline_misses: self.missed.len(),
            process_switch_count: self.process_switch_count,
            completion_points: self.completion_series[self.published_points..].to_vec(),
            metrics: self.metrics(),
            finished: false,
        }
    }

    /// Pushes a snapshot to every observer. `finished` marks the last one of a run.
    pub fn publish(&mut self, finished: bool) {
        if self.observers.is_empty() {
            return;
        }

        let mut snapshot = self.snapshot();
        snapshot.finished = finished;
        self.published_points = self.completion_series.len();
        for observer in self.observers.iter_mut() {
            observer.on_snapshot(&snapshot);
        }
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            algorithm: self.policy.name(),
            completed: self.completed.clone(),
            missed: self.missed.clone(),
            process_switch_count: self.process_switch_count,
            elapsed: self.current_time,
            metrics: self.metrics(),
            completion_series: self.completion_series.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{
        EarliestDeadline, Fcfs, PriorityPreemptive, ProcessStatus, RateMonotonic, RoundRobin,
    };
    use std::sync::mpsc;

    fn run_to_end(engine: &mut SchedulerEngine) {
        while engine.has_running_processes() {
            engine.run_scheduling_cycle();
        }
    }

    #[test]
    fn test_idle_engine() {
        let mut engine = SchedulerEngine::new(Box::new(Fcfs::new()), 1.0);
        assert!(!engine.has_running_processes());
        engine.run_scheduling_cycle();
        assert_eq!(engine.current_time(), 1.0);
        assert_eq!(engine.process_switch_count(), 0);
    }

    #[test]
    fn test_arrival_dispatches_immediately_when_idle() {
        let mut engine = SchedulerEngine::new(Box::new(Fcfs::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 2.0, 0));

        let running = engine.current_process().unwrap();
        assert_eq!(running.pid(), 1);
        assert_eq!(running.status(), ProcessStatus::Running);
        assert_eq!(running.start_time(), Some(0.0));
        assert_eq!(engine.process_switch_count(), 1);
    }

    #[test]
    fn test_completion_records_metrics() {
        let mut engine = SchedulerEngine::new(Box::new(Fcfs::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 3.0, 0));
        run_to_end(&mut engine);

        let done = &engine.completed()[0];
        assert_eq!(done.completion_time(), Some(3.0));
        assert_eq!(done.turnaround_time(), 3.0);
        assert_eq!(done.waiting_time(), 0.0);
        assert_eq!(done.remaining_time(), 0.0);
        assert_eq!(done.status(), ProcessStatus::Completed);
        assert_eq!(
            engine.completion_series(),
            &[CompletionPoint {
                time: 3.0,
                completed: 1
            }]
        );
    }

    #[test]
    fn test_round_robin_requeues_on_quantum_expiry() {
        let mut engine = SchedulerEngine::new(Box::new(RoundRobin::new(2.0)), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 5.0, 0));
        engine.receive_new_process(Process::new(2, 0.0, 3.0, 0));

        engine.run_scheduling_cycle();
        assert_eq!(engine.current_process().map(|p| p.pid()), Some(1));
        engine.run_scheduling_cycle();
        assert_eq!(engine.current_process().map(|p| p.pid()), Some(2));

        let waiting: Vec<u32> = engine.ready_processes().map(|p| p.pid()).collect();
        assert_eq!(waiting, vec![1]);
        assert_eq!(engine.ready_processes().next().unwrap().time_in_current_quantum(), 0.0);
    }

    #[test]
    fn test_priority_preemption() {
        let mut engine = SchedulerEngine::new(Box::new(PriorityPreemptive::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 10.0, 5));
        engine.run_scheduling_cycle();

        engine.receive_new_process(Process::new(2, 1.0, 2.0, 1));
        assert_eq!(engine.current_process().map(|p| p.pid()), Some(1));

        engine.run_scheduling_cycle();
        assert_eq!(engine.current_process().map(|p| p.pid()), Some(2));
        assert_eq!(engine.process_switch_count(), 2);

        run_to_end(&mut engine);
        let order: Vec<u32> = engine.completed().iter().map(|p| p.pid()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_deadline_miss_is_not_completed() {
        let mut engine = SchedulerEngine::new(Box::new(EarliestDeadline::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 3.0, 0).with_deadline(2.0));
        engine.receive_new_process(Process::new(2, 0.0, 1.0, 0).with_deadline(10.0));
        run_to_end(&mut engine);

        assert_eq!(engine.missed().iter().map(|p| p.pid()).collect::<Vec<_>>(), vec![1]);
        assert_eq!(engine.completed().iter().map(|p| p.pid()).collect::<Vec<_>>(), vec![2]);
        assert_eq!(engine.metrics().deadline_misses, 1);
    }

    #[test]
    fn test_rate_monotonic_recycles_periodic_process() {
        let mut engine = SchedulerEngine::new(Box::new(RateMonotonic::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 1.0, 0).with_period(2.0));
        run_to_end(&mut engine);

        let done = &engine.completed()[0];
        assert_eq!(done.executions(), 2);
        assert_eq!(done.completion_time(), Some(3.0));
        assert_eq!(engine.process_switch_count(), 3);
    }

    #[test]
    fn test_snapshots_are_throttled() {
        let (tx, rx) = mpsc::channel();
        let mut engine =
            SchedulerEngine::new(Box::new(Fcfs::new()), 0.25).with_snapshot_interval(1.0);
        engine.add_observer(Box::new(tx));
        engine.receive_new_process(Process::new(1, 0.0, 2.0, 0));

        for _ in 0..8 {
            engine.run_scheduling_cycle();
        }
        engine.publish(true);

        let snapshots: Vec<Snapshot> = rx.try_iter().collect();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].time, 1.0);
        assert!(snapshots[0].completion_points.is_empty());
        assert_eq!(snapshots[1].completion_points.len(), 1);
        assert!(snapshots[2].finished);
        assert!(snapshots[2].completion_points.is_empty());
    }

    #[test]
    fn test_idle_engine_snapshot_is_not_finished() {
        let mut engine = SchedulerEngine::new(Box::new(Fcfs::new()), 1.0);
        engine.receive_new_process(Process::new(1, 0.0, 1.0, 0));
        run_to_end(&mut engine);

        // A later arrival may still be waiting in the driver.
        let snapshot = engine.snapshot();
        assert!(!engine.has_running_processes());
        assert!(!snapshot.finished);
        assert_eq!(snapshot.completed.len(), 1);
    }
}
