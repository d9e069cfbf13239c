use super::{Process, SchedulerEngine, SimTime, SimulationReport, TIME_EPSILON};
use crate::config::ClockConfig;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// How fast logical ticks are paced against the wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Ticks run back to back.
    Logical,
    /// Each tick sleeps `base_tick / speed` seconds.
    RealTime { base_tick: f64, speed: f64 },
}

impl Pacing {
    pub fn from_config(config: &ClockConfig) -> Self {
        if config.use_real_time_simulation {
            Pacing::RealTime {
                base_tick: config.base_tick.unwrap_or(config.tick),
                speed: config.simulation_speed,
            }
        } else {
            Pacing::Logical
        }
    }

    /// Wall-clock pause after each tick. Ratios a `Duration` cannot hold
    /// are rejected by `ClockConfig::validate` and never sleep here.
    pub fn delay(&self) -> Option<Duration> {
        match *self {
            Pacing::Logical => None,
            Pacing::RealTime { base_tick, speed } => Duration::try_from_secs_f64(base_tick / speed).ok(),
        }
    }
}

/// Control messages, honoured only between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Pause,
    Resume,
    /// Runs exactly one tick while paused.
    Step,
    Stop,
}

/// Feeds arrivals into the engine and runs one scheduling cycle per tick.
pub struct ClockDriver {
    engine: SchedulerEngine,
    pending: VecDeque<Process>,
    pacing: Pacing,
    commands: Option<Receiver<DriverCommand>>,
    paused: bool,
    ticks: u64,
}

impl ClockDriver {
    pub fn new(engine: SchedulerEngine, mut arrivals: Vec<Process>, pacing: Pacing) -> Self {
        arrivals.sort_by(|a, b| a.arrival_time().total_cmp(&b.arrival_time()));
        Self {
            engine,
            pending: arrivals.into(),
            pacing,
            commands: None,
            paused: false,
            ticks: 0,
        }
    }

    pub fn with_commands(mut self, commands: Receiver<DriverCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn engine(&self) -> &SchedulerEngine {
        &self.engine
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && !self.engine.has_running_processes()
    }

    /// Hands over every process that has arrived by `now`, oldest first.
    fn admit_arrivals(&mut self, now: SimTime) {
        while self
            .pending
            .front()
            .is_some_and(|p| p.arrival_time() <= now + TIME_EPSILON)
        {
            if let Some(process) = self.pending.pop_front() {
                self.engine.receive_new_process(process);
            }
        }
    }

    /// One atomic step: admit arrivals, then run one scheduling cycle.
    pub fn tick(&mut self) {
        let now = self.engine.current_time();
        self.admit_arrivals(now);
        self.engine.run_scheduling_cycle();
        self.ticks += 1;
    }

    /// Returns false once the driver has been told to stop.
    fn poll_commands(&mut self) -> bool {
        let Some(commands) = self.commands.as_ref() else {
            return true;
        };

        loop {
            let command = if self.paused {
                match commands.recv() {
                    Ok(command) => command,
                    Err(_) => {
                        // Nobody is left to resume us.
                        self.paused = false;
                        return true;
                    }
                }
            } else {
                match commands.try_recv() {
                    Ok(command) => command,
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => return true,
                }
            };

            debug!(?command, "Driver command received");
            match command {
                DriverCommand::Stop => return false,
                DriverCommand::Pause => self.paused = true,
                DriverCommand::Resume => self.paused = false,
                DriverCommand::Step if self.paused => return true,
                DriverCommand::Step => {}
            }
        }
    }

    /// Runs until every arrival has been admitted and retired, or until stopped.
    pub fn run(mut self) -> SimulationReport {
        info!(
            algorithm = self.engine.algorithm(),
            arrivals = self.pending.len(),
            pacing = ?self.pacing,
            "Simulation started"
        );

        let mut stopped = false;
        while !self.is_finished() {
            if !self.poll_commands() {
                stopped = true;
                break;
            }
            self.tick();
            if let Some(delay) = self.pacing.delay() {
                thread::sleep(delay);
            }
        }

        self.engine.publish(true);
        let report = self.engine.report();
        info!(
            stopped,
            ticks = self.ticks,
            elapsed = report.elapsed,
            completed = report.completed.len(),
            missed = report.missed.len(),
            switches = report.process_switch_count,
            "Simulation finished"
        );
        report
    }
}
