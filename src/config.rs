//! Simulation configuration.
//!
//! Loaded from a JSON document with `scheduling`, `clock` and
//! `processGeneration` sections. Everything is validated up front so the
//! engine only ever sees well-formed values.

use crate::error::{ensure_positive, ConfigError, ConfigResult};
use crate::scheduler::{Algorithm, SimTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub process_generation: ProcessGenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingConfig {
    #[serde(alias = "scheduleAlgorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub time_quantum: Option<SimTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockConfig {
    /// Simulated time advanced per scheduling cycle.
    pub tick: SimTime,
    pub use_real_time_simulation: bool,
    /// Wall-clock seconds per tick at speed 1. Defaults to `tick`.
    pub base_tick: Option<f64>,
    pub simulation_speed: f64,
    /// Simulated time between two published snapshots.
    pub snapshot_interval: SimTime,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick: 1.0,
            use_real_time_simulation: false,
            base_tick: None,
            simulation_speed: 1.0,
            snapshot_interval: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateConfig {
    pub lambda: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedValues<T> {
    pub values: Vec<T>,
    pub weights: Vec<f64>,
}

impl<T> Default for WeightedValues<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            weights: Vec::new(),
        }
    }
}

impl<T> WeightedValues<T> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn validate(&self, field: &str) -> ConfigResult<()> {
        if self.values.is_empty() && self.weights.is_empty() {
            return Ok(());
        }
        if self.values.len() != self.weights.len() {
            return Err(ConfigError::InvalidWeights(format!(
                "{field}: {} values but {} weights",
                self.values.len(),
                self.weights.len()
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidWeights(format!(
                "{field}: weights must be finite and non-negative"
            )));
        }
        if self.weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidWeights(format!(
                "{field}: weights must not all be zero"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessGenerationConfig {
    pub use_process_generation: bool,
    /// Unseeded runs draw from OS entropy.
    pub seed: Option<u64>,
    pub max_time: SimTime,
    pub arrival: RateConfig,
    pub burst: RateConfig,
    pub priorities: WeightedValues<i32>,
    pub periods: WeightedValues<SimTime>,
    #[serde(alias = "deadline")]
    pub deadlines: WeightedValues<SimTime>,
    /// Static process list, relative to the configuration file.
    pub static_processes: PathBuf,
}

impl Default for ProcessGenerationConfig {
    fn default() -> Self {
        Self {
            use_process_generation: false,
            seed: None,
            max_time: 50.0,
            arrival: RateConfig { lambda: 0.5 },
            burst: RateConfig { lambda: 0.2 },
            priorities: WeightedValues::default(),
            periods: WeightedValues::default(),
            deadlines: WeightedValues::default(),
            static_processes: PathBuf::from("static_processes.json"),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        info!(path = %path.display(), algorithm = %config.scheduling.algorithm, "Configuration loaded");
        Ok(config)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.scheduling.validate()?;
        self.clock.validate()?;
        self.process_generation.validate()
    }
}

impl SchedulingConfig {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            time_quantum: None,
        }
    }

    pub fn with_time_quantum(mut self, time_quantum: SimTime) -> Self {
        self.time_quantum = Some(time_quantum);
        self
    }

    pub fn algorithm(&self) -> ConfigResult<Algorithm> {
        self.algorithm.parse()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.algorithm()?.requires_quantum() {
            let quantum = self.time_quantum.ok_or(ConfigError::MissingTimeQuantum)?;
            ensure_positive("timeQuantum", quantum)?;
        }
        Ok(())
    }
}

impl ClockConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("tick", self.tick)?;
        ensure_positive("simulationSpeed", self.simulation_speed)?;
        ensure_positive("snapshotInterval", self.snapshot_interval)?;
        let base_tick = ensure_positive("baseTick", self.base_tick.unwrap_or(self.tick))?;
        let seconds = base_tick / self.simulation_speed;
        if self.use_real_time_simulation && Duration::try_from_secs_f64(seconds).is_err() {
            return Err(ConfigError::PacingOutOfRange { seconds });
        }
        Ok(())
    }
}

impl ProcessGenerationConfig {
    /// Checks the generation parameters only when generation is enabled.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.use_process_generation {
            return Ok(());
        }
        self.validate_generation()
    }

    /// Checks rates, horizon and weight tables regardless of the flag.
    pub fn validate_generation(&self) -> ConfigResult<()> {
        ensure_positive("maxTime", self.max_time)?;
        ensure_positive("arrival.lambda", self.arrival.lambda)?;
        ensure_positive("burst.lambda", self.burst.lambda)?;
        self.priorities.validate("priorities")?;
        self.periods.validate("periods")?;
        self.deadlines.validate("deadlines")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = SimulationConfig::from_json(r#"{"scheduling": {"algorithm": "FCFS"}}"#).unwrap();
        assert_eq!(config.clock.tick, 1.0);
        assert!(!config.clock.use_real_time_simulation);
        assert!(!config.process_generation.use_process_generation);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "scheduling": {"scheduleAlgorithm": "Round Robin", "timeQuantum": 2},
            "clock": {"tick": 0.5, "useRealTimeSimulation": true, "simulationSpeed": 4},
            "processGeneration": {
                "useProcessGeneration": true,
                "seed": 7,
                "maxTime": 20,
                "arrival": {"lambda": 1.0},
                "burst": {"lambda": 0.5},
                "priorities": {"values": [0, 1], "weights": [0.7, 0.3]},
                "deadline": {"values": [10, 20], "weights": [1, 1]}
            }
        }"#;
        let config = SimulationConfig::from_json(json).unwrap();
        assert_eq!(config.scheduling.time_quantum, Some(2.0));
        assert_eq!(config.clock.simulation_speed, 4.0);
        assert_eq!(config.process_generation.seed, Some(7));
        assert_eq!(config.process_generation.deadlines.values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_round_robin_without_quantum_is_rejected() {
        let err = SimulationConfig::from_json(r#"{"scheduling": {"algorithm": "rr"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTimeQuantum));
    }

    #[test]
    fn test_non_positive_tick_is_rejected() {
        let json = r#"{"scheduling": {"algorithm": "FCFS"}, "clock": {"tick": 0}}"#;
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "tick", .. }));
    }

    #[test]
    fn test_unsleepable_pacing_is_rejected() {
        let json = r#"{
            "scheduling": {"algorithm": "FCFS"},
            "clock": {"tick": 1, "useRealTimeSimulation": true, "baseTick": 1e300, "simulationSpeed": 1e-300}
        }"#;
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::PacingOutOfRange { .. }));

        // The same clock is fine when ticks are not paced.
        let json = json.replace("\"useRealTimeSimulation\": true", "\"useRealTimeSimulation\": false");
        assert!(SimulationConfig::from_json(&json).is_ok());
    }

    #[test]
    fn test_infinite_tick_is_rejected() {
        let mut clock = ClockConfig::default();
        clock.tick = f64::INFINITY;
        assert!(matches!(
            clock.validate(),
            Err(ConfigError::NonPositive { field: "tick", .. })
        ));
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let err = SimulationConfig::from_json(r#"{"scheduling": {"algorithm": "CFS"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlgorithm(_)));
    }

    #[test]
    fn test_mismatched_weights_are_rejected() {
        let json = r#"{
            "scheduling": {"algorithm": "FCFS"},
            "processGeneration": {
                "useProcessGeneration": true,
                "priorities": {"values": [0, 1, 2], "weights": [1.0]}
            }
        }"#;
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeights(_)));
    }

    #[test]
    fn test_non_positive_lambda_is_rejected() {
        let json = r#"{
            "scheduling": {"algorithm": "FCFS"},
            "processGeneration": {"useProcessGeneration": true, "arrival": {"lambda": 0}}
        }"#;
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "arrival.lambda", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = SimulationConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
