pub mod driver;
pub mod job;
pub mod metrics;

pub use driver::{RunState, Sim, SimOutcome};
pub use job::{Job, validate_workload};
pub use metrics::{Metrics, ProcessReport, compare, summarize};
