use anyhow::Context;
use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use scheduling_simulator::{
    init_tracing, workload, ClockDriver, LogTarget, Pacing, Process, ProcessRunner, SchedulerEngine,
    SimulationConfig, SimulationHandle, SimulationReport,
};
use std::{
    env, io,
    path::{Path, PathBuf},
    sync::mpsc,
};
use tracing::info;

const DEFAULT_CONFIG: &str = "config.json";

fn print_report(report: &SimulationReport) {
    println!("Algorithm: {}", report.algorithm);
    println!(
        "{:>5} {:>9} {:>9} {:>9} {:>11} {:>11} {:>9}",
        "PID", "Arrival", "Burst", "Start", "Completion", "Turnaround", "Waiting"
    );
    for process in &report.completed {
        println!(
            "{:>5} {:>9.2} {:>9.2} {:>9.2} {:>11.2} {:>11.2} {:>9.2}",
            process.pid(),
            process.arrival_time(),
            process.burst_time(),
            process.start_time().unwrap_or_default(),
            process.completion_time().unwrap_or_default(),
            process.turnaround_time(),
            process.waiting_time(),
        );
    }
    if !report.missed.is_empty() {
        let missed: Vec<String> = report.missed.iter().map(|p| p.pid().to_string()).collect();
        println!("Deadline misses: {}", missed.join(", "));
    }

    let metrics = &report.metrics;
    println!("Elapsed:            {:.2}", report.elapsed);
    println!("Process switches:   {}", report.process_switch_count);
    println!("Avg turnaround:     {:.2}", metrics.average_turnaround);
    println!("Avg waiting:        {:.2}", metrics.average_waiting);
    println!("Avg response:       {:.2}", metrics.average_response);
    println!("Throughput:         {:.3}", metrics.throughput);
}

fn run_interactive(
    config: &SimulationConfig,
    engine: SchedulerEngine,
    arrivals: Vec<Process>,
) -> anyhow::Result<Option<SimulationReport>> {
    let mut engine = engine;
    let (snapshot_tx, snapshot_rx) = mpsc::channel();
    engine.add_observer(Box::new(snapshot_tx));

    let pacing = Pacing::from_config(&config.clock);
    let simulation = SimulationHandle::spawn(engine, arrivals, pacing)
        .context("Failed to start the simulation thread")?;

    execute!(io::stdout(), Clear(ClearType::All))?;
    let mut runner =
        ProcessRunner::new(simulation, snapshot_rx).context("Failed to set up the terminal")?;

    while runner.run() {}

    let report = runner.finish();
    execute!(io::stdout(), Clear(ClearType::All))?;
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let headless = args.iter().any(|arg| arg == "--headless");
    let config_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let log_target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(env::temp_dir().join("scheduling-simulator.log"))
    };
    init_tracing(log_target).context("Failed to initialize tracing")?;

    let config = SimulationConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let arrivals = workload::build_arrivals(&config.process_generation, base_dir)
        .context("Failed to build the process list")?;
    let engine = SchedulerEngine::from_config(&config)?;

    info!(headless, processes = arrivals.len(), "Starting simulation");

    let report = if headless {
        Some(ClockDriver::new(engine, arrivals, Pacing::Logical).run())
    } else {
        run_interactive(&config, engine, arrivals)?
    };

    if let Some(report) = report {
        print_report(&report);
    }
    Ok(())
}
