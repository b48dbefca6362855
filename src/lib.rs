pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use config::{Algorithm, LevelConfig, SchedulerConfig};
pub use crate::core::{ProcessState, SimEvent};
pub use error::{ConfigError, InvariantViolation, SimError, WorkloadError};
pub use scheduler::Scheduler;
pub use sim::{Job, Metrics, ProcessReport, RunState, Sim, SimOutcome};
