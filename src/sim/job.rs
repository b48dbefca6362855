use crate::core::state::{Pid, Process, Ticks};
use crate::error::WorkloadError;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One workload record, as produced by a generator or loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub pid: Pid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub arrival_time: i64,
    pub burst_time: i64,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_level: Option<usize>,
}

impl Job {
    pub fn new(pid: Pid, arrival_time: i64, burst_time: i64) -> Self {
        Self {
            pid,
            name: None,
            arrival_time,
            burst_time,
            priority: 0,
            queue_level: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_queue_level(mut self, level: usize) -> Self {
        self.queue_level = Some(level);
        self
    }

    pub fn validate(&self) -> Result<(), WorkloadError> {
        if self.arrival_time < 0 {
            return Err(WorkloadError::NegativeArrival {
                pid: self.pid,
                arrival_time: self.arrival_time,
            });
        }
        if self.burst_time <= 0 {
            return Err(WorkloadError::NonPositiveBurst {
                pid: self.pid,
                burst_time: self.burst_time,
            });
        }
        Ok(())
    }

    pub fn into_process(self) -> Result<Process, WorkloadError> {
        self.validate()?;
        let mut process = Process::new(
            self.pid,
            self.arrival_time as Ticks,
            self.burst_time as Ticks,
            self.priority,
        );
        process.name = self.name;
        process.queue_level = self.queue_level;
        Ok(process)
    }
}

/// Reject the whole workload on the first bad record.
///
/// Explicit `queue_level`s must fall below `levels` when the run is multilevel.
pub fn validate_workload(jobs: &[Job], levels: Option<usize>) -> Result<(), WorkloadError> {
    let mut seen = FxHashSet::default();
    for job in jobs {
        if !seen.insert(job.pid) {
            return Err(WorkloadError::DuplicatePid(job.pid));
        }
        job.validate()?;
        if let (Some(level), Some(levels)) = (job.queue_level, levels) {
            if level >= levels {
                return Err(WorkloadError::QueueLevelOutOfRange {
                    pid: job.pid,
                    level,
                    levels,
                });
            }
        }
    }
    Ok(())
}
