//! Arrival-list producers: a verbatim static list or a seeded synthetic workload.

use crate::config::{ProcessGenerationConfig, WeightedValues};
use crate::error::{ConfigError, WorkloadError, WorkloadResult};
use crate::scheduler::{Pid, Process, SimTime};
use rand::distributions::{Distribution, Open01, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessSpec {
    pid: Pid,
    arrival_time: SimTime,
    burst_time: SimTime,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    period: Option<SimTime>,
    #[serde(default)]
    deadline: Option<SimTime>,
}

impl ProcessSpec {
    fn into_process(self) -> WorkloadResult<Process> {
        let invalid = |reason: &str| WorkloadError::InvalidProcess {
            pid: self.pid,
            reason: reason.to_owned(),
        };

        if !(self.arrival_time >= 0.0) {
            return Err(invalid("arrival time must be non-negative"));
        }
        if !(self.burst_time > 0.0) {
            return Err(invalid("burst time must be positive"));
        }
        if self.period.is_some_and(|period| !(period > 0.0)) {
            return Err(invalid("period must be positive"));
        }

        let mut process = Process::new(self.pid, self.arrival_time, self.burst_time, self.priority);
        if let Some(period) = self.period {
            process = process.with_period(period);
        }
        if let Some(deadline) = self.deadline {
            process = process.with_deadline(deadline);
        }
        Ok(process)
    }
}

/// Parses a JSON array of process descriptors into an arrival-ordered list.
pub fn parse_static(json: &str) -> WorkloadResult<Vec<Process>> {
    let specs: Vec<ProcessSpec> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let mut processes = Vec::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.pid) {
            return Err(WorkloadError::DuplicatePid(spec.pid));
        }
        processes.push(spec.into_process()?);
    }

    processes.sort_by(|a, b| a.arrival_time().total_cmp(&b.arrival_time()));
    Ok(processes)
}

pub fn load_static(path: impl AsRef<Path>) -> WorkloadResult<Vec<Process>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| WorkloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let processes = parse_static(&json)?;
    info!(path = %path.display(), count = processes.len(), "Static processes loaded");
    Ok(processes)
}

/// Synthetic workload: exponential inter-arrival and burst times, weighted
/// choice of priority, period and deadline.
pub struct ProcessGenerator {
    config: ProcessGenerationConfig,
    rng: StdRng,
    last_pid: Pid,
}

impl ProcessGenerator {
    pub fn new(config: &ProcessGenerationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: config.clone(),
            rng,
            last_pid: 0,
        }
    }

    fn next_pid(&mut self) -> Pid {
        self.last_pid += 1;
        self.last_pid
    }

    fn exponential(&mut self, lambda: f64) -> f64 {
        let u: f64 = self.rng.sample(Open01);
        -u.ln() / lambda
    }

    /// Arrival times from a Poisson process on `[0, max_time)`.
    fn arrival_times(&mut self) -> Vec<SimTime> {
        let lambda = self.config.arrival.lambda;
        let mut arrivals = Vec::new();
        let mut last = 0.0;
        loop {
            last += self.exponential(lambda);
            if last >= self.config.max_time {
                break;
            }
            arrivals.push(last);
        }
        arrivals
    }

    fn sample<T: Copy>(
        rng: &mut StdRng,
        choices: &WeightedValues<T>,
        field: &str,
        count: usize,
    ) -> WorkloadResult<Vec<Option<T>>> {
        if choices.is_empty() {
            return Ok(vec![None; count]);
        }
        let index = WeightedIndex::new(&choices.weights)
            .map_err(|e| ConfigError::InvalidWeights(format!("{field}: {e}")))?;
        Ok((0..count)
            .map(|_| Some(choices.values[index.sample(&mut *rng)]))
            .collect())
    }

    pub fn generate(&mut self) -> WorkloadResult<Vec<Process>> {
        self.config.validate_generation()?;

        let arrivals = self.arrival_times();
        let count = arrivals.len();
        let burst_lambda = self.config.burst.lambda;
        let bursts: Vec<SimTime> = (0..count)
            .map(|_| self.exponential(burst_lambda))
            .collect();
        let priorities = Self::sample(&mut self.rng, &self.config.priorities, "priorities", count)?;
        let periods = Self::sample(&mut self.rng, &self.config.periods, "periods", count)?;
        let deadlines = Self::sample(&mut self.rng, &self.config.deadlines, "deadlines", count)?;

        let mut processes = Vec::with_capacity(count);
        for i in 0..count {
            let pid = self.next_pid();
            let mut process = Process::new(pid, arrivals[i], bursts[i], priorities[i].unwrap_or(0));
            if let Some(period) = periods[i] {
                process = process.with_period(period);
            }
            if let Some(deadline) = deadlines[i] {
                process = process.with_deadline(deadline);
            }
            processes.push(process);
        }

        info!(count, seed = ?self.config.seed, "Synthetic processes generated");
        Ok(processes)
    }
}

/// Produces the arrival list described by `config`. Relative static paths
/// resolve against `base_dir`.
pub fn build_arrivals(
    config: &ProcessGenerationConfig,
    base_dir: &Path,
) -> WorkloadResult<Vec<Process>> {
    if config.use_process_generation {
        ProcessGenerator::new(config).generate()
    } else {
        load_static(base_dir.join(&config.static_processes))
    }
}
