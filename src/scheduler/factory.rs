use super::{
    EarliestDeadline, Fcfs, PriorityNonPreemptive, PriorityPreemptive, RateMonotonic, RoundRobin,
    SchedulingPolicy, ShortestJob,
};
use crate::config::SchedulingConfig;
use crate::error::{ensure_positive, ConfigError, ConfigResult};
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Fcfs,
    ShortestJob,
    PriorityNonPreemptive,
    PriorityPreemptive,
    RoundRobin,
    RateMonotonic,
    EarliestDeadline,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Fcfs,
        Algorithm::ShortestJob,
        Algorithm::PriorityNonPreemptive,
        Algorithm::PriorityPreemptive,
        Algorithm::RoundRobin,
        Algorithm::RateMonotonic,
        Algorithm::EarliestDeadline,
    ];

    pub fn requires_quantum(self) -> bool {
        self == Algorithm::RoundRobin
    }
}

/// Uppercases and folds every run of separators into a single underscore,
/// so "Round Robin", "round-robin" and "ROUND_ROBIN" compare equal.
fn normalize(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c.to_ascii_uppercase());
        } else if !normalized.is_empty() && !normalized.ends_with('_') {
            normalized.push('_');
        }
    }
    while normalized.ends_with('_') {
        normalized.pop();
    }
    normalized
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let algorithm = match normalize(name).as_str() {
            "FCFS" | "FIFO" | "FIRST_COME_FIRST_SERVED" => Algorithm::Fcfs,
            "SJF" | "SJ" | "SHORTEST_JOB" | "SHORTEST_JOB_FIRST" => Algorithm::ShortestJob,
            "PRIORITY_NON_PREEMPTIVE"
            | "PRIORITY_NONPREEMPTIVE"
            | "PRIORITY_SCHEDULING_NON_PREEMPTIVE" => Algorithm::PriorityNonPreemptive,
            "PRIORITY_PREEMPTIVE" | "PRIORITY_SCHEDULING_PREEMPTIVE" => {
                Algorithm::PriorityPreemptive
            }
            "RR" | "ROUND_ROBIN" => Algorithm::RoundRobin,
            "RM" | "RATE_MONOTONIC" => Algorithm::RateMonotonic,
            "EDF" | "EARLIEST_DEADLINE" | "EARLIEST_DEADLINE_FIRST" => Algorithm::EarliestDeadline,
            _ => return Err(ConfigError::UnknownAlgorithm(name.to_owned())),
        };
        Ok(algorithm)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::ShortestJob => "Shortest Job First",
            Algorithm::PriorityNonPreemptive => "Priority (Non-Preemptive)",
            Algorithm::PriorityPreemptive => "Priority (Preemptive)",
            Algorithm::RoundRobin => "Round Robin",
            Algorithm::RateMonotonic => "Rate Monotonic",
            Algorithm::EarliestDeadline => "Earliest Deadline First",
        };
        f.write_str(name)
    }
}

/// Builds the policy named by `config`, failing fast on unknown names and on
/// a missing or non-positive Round-Robin quantum.
pub fn create_policy(config: &SchedulingConfig) -> ConfigResult<Box<dyn SchedulingPolicy>> {
    let algorithm: Algorithm = config.algorithm.parse()?;

    let policy: Box<dyn SchedulingPolicy> = match algorithm {
        Algorithm::Fcfs => Box::new(Fcfs::new()),
        Algorithm::ShortestJob => Box::new(ShortestJob::new()),
        Algorithm::PriorityNonPreemptive => Box::new(PriorityNonPreemptive::new()),
        Algorithm::PriorityPreemptive => Box::new(PriorityPreemptive::new()),
        Algorithm::RoundRobin => {
            let quantum = config.time_quantum.ok_or(ConfigError::MissingTimeQuantum)?;
            Box::new(RoundRobin::new(ensure_positive("timeQuantum", quantum)?))
        }
        Algorithm::RateMonotonic => Box::new(RateMonotonic::new()),
        Algorithm::EarliestDeadline => Box::new(EarliestDeadline::new()),
    };

    info!(algorithm = %algorithm, quantum = ?config.time_quantum, "Scheduling policy created");
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(algorithm: &str, time_quantum: Option<f64>) -> SchedulingConfig {
        SchedulingConfig {
            algorithm: algorithm.to_owned(),
            time_quantum,
        }
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!("fcfs".parse::<Algorithm>().unwrap(), Algorithm::Fcfs);
        assert_eq!("Round Robin".parse::<Algorithm>().unwrap(), Algorithm::RoundRobin);
        assert_eq!("round_robin".parse::<Algorithm>().unwrap(), Algorithm::RoundRobin);
        assert_eq!(
            "Priority Scheduling (Preemptive)".parse::<Algorithm>().unwrap(),
            Algorithm::PriorityPreemptive
        );
        assert_eq!(
            "priority non-preemptive".parse::<Algorithm>().unwrap(),
            Algorithm::PriorityNonPreemptive
        );
        assert_eq!(
            "Shortest Job First".parse::<Algorithm>().unwrap(),
            Algorithm::ShortestJob
        );
        assert_eq!("edf".parse::<Algorithm>().unwrap(), Algorithm::EarliestDeadline);
        assert_eq!("Rate Monotonic".parse::<Algorithm>().unwrap(), Algorithm::RateMonotonic);
    }

    #[test]
    fn test_display_names_parse_back() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = create_policy(&config("lottery", None)).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownAlgorithm(ref name) if name == "lottery"));
    }

    #[test]
    fn test_round_robin_requires_positive_quantum() {
        assert!(matches!(
            create_policy(&config("RR", None)),
            Err(ConfigError::MissingTimeQuantum)
        ));
        assert!(matches!(
            create_policy(&config("RR", Some(0.0))),
            Err(ConfigError::NonPositive { field: "timeQuantum", .. })
        ));
        assert!(matches!(
            create_policy(&config("RR", Some(-1.0))),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(create_policy(&config("RR", Some(2.0))).is_ok());
    }

    #[test]
    fn test_quantum_ignored_for_other_policies() {
        let policy = create_policy(&config("FCFS", None)).unwrap();
        assert_eq!(policy.name(), "First Come First Served");
    }
}
