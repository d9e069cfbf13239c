use super::display::{DisplayState, DisplayTerminal};
use super::{ClockDriver, DriverCommand, Pacing, Process, SchedulerEngine, SimulationReport, Snapshot};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

pub enum RunnerEvent {
    Quit,
    Pause,
    Resume,
    Step,
    None,
}

/// A clock driver running on its own worker thread.
pub struct SimulationHandle {
    commands: Sender<DriverCommand>,
    worker: JoinHandle<SimulationReport>,
}

impl SimulationHandle {
    /// Moves the engine onto a dedicated `sim-clock` thread and starts ticking.
    pub fn spawn(
        engine: SchedulerEngine,
        arrivals: Vec<Process>,
        pacing: Pacing,
    ) -> Result<Self, io::Error> {
        let (commands, command_rx) = mpsc::channel();
        let driver = ClockDriver::new(engine, arrivals, pacing).with_commands(command_rx);
        let worker = thread::Builder::new()
            .name("sim-clock".to_owned())
            .spawn(move || driver.run())?;

        Ok(Self { commands, worker })
    }

    pub fn send(&self, command: DriverCommand) {
        // The driver drops its receiver only after it has finished.
        let _ = self.commands.send(command);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn join(self) -> thread::Result<SimulationReport> {
        self.worker.join()
    }

    /// Asks the driver to stop at the next tick boundary and waits for its report.
    pub fn stop(self) -> thread::Result<SimulationReport> {
        self.send(DriverCommand::Stop);
        self.join()
    }
}

/// Drives the terminal display from the snapshots a running simulation publishes.
pub struct ProcessRunner {
    terminal: DisplayTerminal,
    simulation: SimulationHandle,
    snapshots: Receiver<Snapshot>,
    latest: Option<Snapshot>,
    history: Vec<u64>,
    paused: bool,
}

impl ProcessRunner {
    const HISTORY_LIMIT: usize = 512;

    pub fn new(simulation: SimulationHandle, snapshots: Receiver<Snapshot>) -> Result<Self, io::Error> {
        let terminal = DisplayTerminal::new()?;

        Ok(Self {
            terminal,
            simulation,
            snapshots,
            latest: None,
            history: Vec::new(),
            paused: false,
        })
    }

    fn drain_snapshots(&mut self) {
        for snapshot in self.snapshots.try_iter() {
            self.history
                .extend(snapshot.completion_points.iter().map(|p| p.completed as u64));
            self.latest = Some(snapshot);
        }

        if self.history.len() > Self::HISTORY_LIMIT {
            let excess = self.history.len() - Self::HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    fn finished(&self) -> bool {
        self.latest.as_ref().is_some_and(|s| s.finished)
    }

    // Returns false if the program should quit
    pub fn run(&mut self) -> bool {
        self.drain_snapshots();

        let state = DisplayState {
            paused: self.paused,
            finished: self.finished(),
        };
        if let Err(e) = self.terminal.draw(self.latest.as_ref(), &self.history, state) {
            warn!(error = %e, "Failed to draw frame");
            return false;
        }

        match self.terminal.get_input() {
            RunnerEvent::Quit => return false,
            RunnerEvent::Pause if !self.paused => {
                self.paused = true;
                self.simulation.send(DriverCommand::Pause);
            }
            RunnerEvent::Resume if self.paused => {
                self.paused = false;
                self.simulation.send(DriverCommand::Resume);
            }
            RunnerEvent::Step if self.paused => self.simulation.send(DriverCommand::Step),
            _ => {}
        }
        true
    }

    /// Stops the simulation if it is still running and returns its report.
    pub fn finish(self) -> Option<SimulationReport> {
        let Self {
            terminal,
            simulation,
            ..
        } = self;
        drop(terminal);

        let result = if simulation.is_finished() {
            simulation.join()
        } else {
            info!("Stopping simulation before completion");
            simulation.stop()
        };

        match result {
            Ok(report) => Some(report),
            Err(_) => {
                warn!("Simulation thread panicked");
                None
            }
        }
    }
}
