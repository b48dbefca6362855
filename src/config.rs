use crate::core::Ticks;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Time quantum used by Round-Robin when none is configured
pub const DEFAULT_QUANTUM: Ticks = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Fcfs,
    Sjf,
    Srtf,
    RoundRobin,
    Priority,
    PriorityPreemptive,
    Multilevel,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Self::Fcfs,
        Self::Sjf,
        Self::Srtf,
        Self::RoundRobin,
        Self::Priority,
        Self::PriorityPreemptive,
        Self::Multilevel,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::RoundRobin => "rr",
            Self::Priority => "priority",
            Self::PriorityPreemptive => "priority_preemptive",
            Self::Multilevel => "multilevel",
        }
    }

    pub const fn uses_quantum(&self) -> bool {
        matches!(self, Self::RoundRobin)
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "srtf" => Ok(Self::Srtf),
            "rr" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "priority" => Ok(Self::Priority),
            "priority_preemptive" => Ok(Self::PriorityPreemptive),
            "multilevel" | "mlq" => Ok(Self::Multilevel),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One level of a multilevel queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<i64>,
}

impl LevelConfig {
    pub const fn new(algorithm: Algorithm, quantum: Option<i64>) -> Self {
        Self { algorithm, quantum }
    }
}

/// System processes on RR(2), interactive on RR(4), batch on FCFS
pub fn default_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig::new(Algorithm::RoundRobin, Some(2)),
        LevelConfig::new(Algorithm::RoundRobin, Some(4)),
        LevelConfig::new(Algorithm::Fcfs, None),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<i64>,
    #[serde(default)]
    pub context_switch_overhead: i64,
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelConfig>,
}

impl SchedulerConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            quantum: None,
            context_switch_overhead: 0,
            levels: default_levels(),
        }
    }

    pub fn with_quantum(mut self, quantum: i64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    pub fn with_overhead(mut self, overhead: i64) -> Self {
        self.context_switch_overhead = overhead;
        self
    }

    pub fn with_levels(mut self, levels: Vec<LevelConfig>) -> Self {
        self.levels = levels;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_switch_overhead < 0 {
            return Err(ConfigError::NegativeOverhead(self.context_switch_overhead));
        }
        // A quantum only matters to Round-Robin, at the top or on a level
        if self.algorithm.uses_quantum() {
            quantum_ticks(self.quantum)?;
        }

        if self.algorithm == Algorithm::Multilevel {
            if self.levels.is_empty() {
                return Err(ConfigError::NoLevels);
            }
            for (index, level) in self.levels.iter().enumerate() {
                if level.algorithm == Algorithm::Multilevel {
                    return Err(ConfigError::NestedMultilevel(index));
                }
                if level.algorithm.uses_quantum() {
                    quantum_ticks(level.quantum)?;
                }
            }
        }
        Ok(())
    }

    pub fn overhead_ticks(&self) -> Result<Ticks, ConfigError> {
        Ticks::try_from(self.context_switch_overhead)
            .map_err(|_| ConfigError::NegativeOverhead(self.context_switch_overhead))
    }

    /// Number of queue levels, for multilevel runs only
    pub fn queue_levels(&self) -> Option<usize> {
        match self.algorithm {
            Algorithm::Multilevel => Some(self.levels.len()),
            _ => None,
        }
    }

    /// Short label, e.g. `rr(q=2)` or `multilevel[rr(q=2), fcfs]`
    pub fn label(&self) -> String {
        match self.algorithm {
            Algorithm::Multilevel => {
                let levels: Vec<String> = self
                    .levels
                    .iter()
                    .map(|l| label_for(l.algorithm, l.quantum))
                    .collect();
                format!("multilevel[{}]", levels.join(", "))
            }
            algorithm => label_for(algorithm, self.quantum),
        }
    }
}

fn label_for(algorithm: Algorithm, quantum: Option<i64>) -> String {
    if algorithm.uses_quantum() {
        let quantum = quantum.unwrap_or(DEFAULT_QUANTUM as i64);
        format!("{}(q={})", algorithm.as_str(), quantum)
    } else {
        algorithm.as_str().to_owned()
    }
}

/// Resolve an optional configured quantum, rejecting non-positive values
pub fn quantum_ticks(quantum: Option<i64>) -> Result<Ticks, ConfigError> {
    match quantum {
        None => Ok(DEFAULT_QUANTUM),
        Some(q) if q <= 0 => Err(ConfigError::NonPositiveQuantum(q)),
        Some(q) => Ok(q as Ticks),
    }
}
