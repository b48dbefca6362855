use crate::core::state::{Pid, ProcessState, Ticks};
use thiserror::Error;

/// Rejected scheduler configuration. Raised before a run starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown algorithm '{0}' (valid: fcfs, sjf, srtf, rr, priority, priority_preemptive, multilevel)")]
    UnknownAlgorithm(String),

    #[error("time quantum must be positive, got {0}")]
    NonPositiveQuantum(i64),

    #[error("context switch overhead must not be negative, got {0}")]
    NegativeOverhead(i64),

    #[error("multilevel scheduler needs at least one queue level")]
    NoLevels,

    #[error("queue level {0} cannot itself be multilevel")]
    NestedMultilevel(usize),

    #[error("malformed scheduler configuration: {0}")]
    Malformed(String),
}

/// Rejected workload. Raised before a run starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("duplicate pid {0}")]
    DuplicatePid(Pid),

    #[error("process {pid} has negative arrival time {arrival_time}")]
    NegativeArrival { pid: Pid, arrival_time: i64 },

    #[error("process {pid} has non-positive burst time {burst_time}")]
    NonPositiveBurst { pid: Pid, burst_time: i64 },

    #[error("process {pid} assigned to queue level {level}, but only {levels} levels exist")]
    QueueLevelOutOfRange { pid: Pid, level: usize, levels: usize },
}

/// Internal consistency failure. Never expected under a correct driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("process {0} ran with no remaining time")]
    RemainingUnderflow(Pid),

    #[error("process {0} has more remaining time than its burst")]
    RemainingExceedsBurst(Pid),

    #[error("process {0} is marked running but does not hold the CPU")]
    StrayRunning(Pid),

    #[error("terminated process {0} was selected to run")]
    TerminatedReselected(Pid),

    #[error("clock went backwards from {from} to {to}")]
    ClockRegression { from: Ticks, to: Ticks },

    #[error("process {pid} cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },

    #[error("process {0} is already present in a ready queue")]
    AlreadyQueued(Pid),

    #[error("process {0} is running while still present in a ready queue")]
    RunningWhileQueued(Pid),

    #[error("process {pid} is queued in state {state:?}")]
    QueuedNotReady { pid: Pid, state: ProcessState },

    #[error("process {0} was pushed to a queue that does not exist")]
    UnknownQueue(Pid),

    #[error("process {0} is out of sync with the ready-queue index")]
    QueueIndexMismatch(Pid),

    #[error("unknown pid {0}")]
    UnknownPid(Pid),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
