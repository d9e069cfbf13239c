//! End-to-end scheduling scenarios driven through the clock driver.

use pretty_assertions::assert_eq;
use scheduling_simulator::scheduler::{Pid, Process};
use scheduling_simulator::{
    create_policy, ClockDriver, ConfigError, Pacing, SchedulerEngine, SchedulingConfig,
    SimulationConfig, SimulationReport,
};

fn engine(algorithm: &str, quantum: Option<f64>) -> SchedulerEngine {
    let mut config = SchedulingConfig::new(algorithm);
    config.time_quantum = quantum;
    SchedulerEngine::new(create_policy(&config).unwrap(), 1.0)
}

fn simulate(algorithm: &str, quantum: Option<f64>, arrivals: Vec<Process>) -> SimulationReport {
    ClockDriver::new(engine(algorithm, quantum), arrivals, Pacing::Logical).run()
}

fn completion_order(report: &SimulationReport) -> Vec<(Pid, f64)> {
    report
        .completed
        .iter()
        .map(|p| (p.pid(), p.completion_time().unwrap()))
        .collect()
}

/// Pid executed during each tick, `None` while idle.
fn trace(engine: &mut SchedulerEngine, arrivals: Vec<Process>) -> Vec<Option<Pid>> {
    for process in arrivals {
        engine.receive_new_process(process);
    }
    let mut trace = Vec::new();
    while engine.has_running_processes() {
        trace.push(engine.current_process().map(|p| p.pid()));
        engine.run_scheduling_cycle();
    }
    trace
}

#[test]
fn test_fcfs_two_processes() {
    let report = simulate(
        "FCFS",
        None,
        vec![Process::new(1, 0.0, 5.0, 0), Process::new(2, 2.0, 3.0, 0)],
    );

    assert_eq!(completion_order(&report), vec![(1, 5.0), (2, 8.0)]);
    let p2 = &report.completed[1];
    assert_eq!(p2.start_time(), Some(5.0));
    assert_eq!(p2.turnaround_time(), 6.0);
    assert_eq!(p2.waiting_time(), 3.0);
    assert_eq!(p2.response_time(), Some(3.0));
    assert_eq!(report.process_switch_count, 2);
    assert_eq!(report.elapsed, 8.0);
}

#[test]
fn test_fcfs_ties_keep_arrival_order() {
    let report = simulate(
        "fcfs",
        None,
        vec![
            Process::new(3, 0.0, 1.0, 0),
            Process::new(1, 0.0, 1.0, 0),
            Process::new(2, 0.0, 1.0, 0),
        ],
    );
    let pids: Vec<Pid> = report.completed.iter().map(|p| p.pid()).collect();
    assert_eq!(pids, vec![3, 1, 2]);
}

#[test]
fn test_round_robin_trace() {
    let mut engine = engine("Round Robin", Some(2.0));
    let trace = trace(
        &mut engine,
        vec![Process::new(1, 0.0, 5.0, 0), Process::new(2, 0.0, 3.0, 0)],
    );

    assert_eq!(
        trace,
        vec![
            Some(1),
            Some(1),
            Some(2),
            Some(2),
            Some(1),
            Some(1),
            Some(2),
            Some(1)
        ]
    );
    let completed: Vec<(Pid, f64)> = engine
        .completed()
        .iter()
        .map(|p| (p.pid(), p.completion_time().unwrap()))
        .collect();
    assert_eq!(completed, vec![(2, 7.0), (1, 8.0)]);
}

#[test]
fn test_round_robin_through_driver() {
    let report = simulate(
        "RR",
        Some(2.0),
        vec![Process::new(1, 0.0, 5.0, 0), Process::new(2, 0.0, 3.0, 0)],
    );
    assert_eq!(completion_order(&report), vec![(2, 7.0), (1, 8.0)]);
    assert_eq!(report.process_switch_count, 5);
}

#[test]
fn test_round_robin_rejects_non_positive_quantum() {
    for json in [
        r#"{"scheduling": {"algorithm": "Round Robin", "timeQuantum": 0}}"#,
        r#"{"scheduling": {"algorithm": "Round Robin", "timeQuantum": -2}}"#,
    ] {
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "timeQuantum", .. }));
    }

    let err = create_policy(&SchedulingConfig::new("round robin").with_time_quantum(0.0))
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::NonPositive { .. }));
}

#[test]
fn test_engine_from_config_fails_before_any_tick() {
    let config = SimulationConfig {
        scheduling: SchedulingConfig::new("ROUND_ROBIN"),
        clock: Default::default(),
        process_generation: Default::default(),
    };
    assert!(matches!(
        SchedulerEngine::from_config(&config),
        Err(ConfigError::MissingTimeQuantum)
    ));
}

#[test]
fn test_shortest_job_first() {
    let report = simulate(
        "SJF",
        None,
        vec![
            Process::new(1, 0.0, 6.0, 0),
            Process::new(2, 1.0, 8.0, 0),
            Process::new(3, 2.0, 7.0, 0),
            Process::new(4, 3.0, 3.0, 0),
        ],
    );
    assert_eq!(
        completion_order(&report),
        vec![(1, 6.0), (4, 9.0), (3, 16.0), (2, 24.0)]
    );
}

#[test]
fn test_priority_non_preemptive() {
    let report = simulate(
        "Priority Non-Preemptive",
        None,
        vec![Process::new(1, 0.0, 4.0, 5), Process::new(2, 1.0, 2.0, 1)],
    );
    assert_eq!(completion_order(&report), vec![(1, 4.0), (2, 6.0)]);
}

#[test]
fn test_priority_preemptive_dispatches_urgent_arrival() {
    let report = simulate(
        "Priority Preemptive",
        None,
        vec![Process::new(1, 0.0, 4.0, 5), Process::new(2, 1.0, 2.0, 1)],
    );
    assert_eq!(completion_order(&report), vec![(2, 4.0), (1, 6.0)]);
    assert_eq!(report.completed[0].start_time(), Some(2.0));
    assert_eq!(report.process_switch_count, 3);
}

#[test]
fn test_earliest_deadline_first_reports_misses() {
    let report = simulate(
        "EDF",
        None,
        vec![
            Process::new(1, 0.0, 3.0, 0).with_deadline(4.0),
            Process::new(2, 0.0, 3.0, 0).with_deadline(5.0),
            Process::new(3, 1.0, 1.0, 0).with_deadline(3.5),
        ],
    );

    // P3 preempts P1 at t=2, P1 finishes exactly on its deadline, P2 overruns.
    assert_eq!(completion_order(&report), vec![(3, 3.0), (1, 4.0)]);
    let missed: Vec<Pid> = report.missed.iter().map(|p| p.pid()).collect();
    assert_eq!(missed, vec![2]);
    assert_eq!(report.missed[0].completion_time(), Some(7.0));
    assert_eq!(report.metrics.deadline_misses, 1);
}

#[test]
fn test_rate_monotonic_prefers_short_period() {
    let report = simulate(
        "Rate Monotonic",
        None,
        vec![
            Process::new(1, 0.0, 2.0, 0).with_period(3.0),
            Process::new(2, 0.0, 1.0, 0).with_period(1.0),
        ],
    );

    let pids: Vec<Pid> = report.completed.iter().map(|p| p.pid()).collect();
    assert_eq!(pids, vec![2, 1]);
    assert_eq!(report.completed[0].executions(), 1);
    assert_eq!(report.completed[1].executions(), 3);
    assert!(report.missed.is_empty());
}

#[test]
fn test_unknown_algorithm_fails_fast() {
    let err = create_policy(&SchedulingConfig::new("Lottery")).err().unwrap();
    assert_eq!(err.to_string(), "Unknown scheduling algorithm: Lottery");
}
