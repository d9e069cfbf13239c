//! Discrete-time CPU scheduling simulator.
//!
//! A [`ClockDriver`] feeds an arrival-ordered process list into a
//! [`SchedulerEngine`], which advances one tick at a time and delegates
//! selection to an interchangeable [`SchedulingPolicy`]. Observers receive
//! throttled [`Snapshot`]s of the ready, running and completed sets.

pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod workload;

pub use config::{ClockConfig, ProcessGenerationConfig, SchedulingConfig, SimulationConfig};
pub use error::{ConfigError, WorkloadError};
pub use logging::{init_tracing, LogTarget};
pub use scheduler::{
    create_policy, Algorithm, ClockDriver, CompletionOutcome, DriverCommand, Metrics, Pacing,
    PreemptionReason, Process, ProcessRunner, ProcessStatus, SchedulerEngine, SchedulingPolicy,
    SimulationHandle, SimulationReport, Snapshot, SnapshotObserver,
};
