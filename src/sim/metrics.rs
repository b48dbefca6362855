use crate::core::{
    ExecutionLog,
    state::{Pid, Process, ProcessState, Ticks},
};
use average::{Estimate, Mean};
use serde::{Deserialize, Serialize};

/// Timing record of one terminated process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub pid: Pid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: i64,
    pub start_time: Ticks,
    pub completion_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
    pub response_time: Ticks,
}

impl ProcessReport {
    /// `None` unless the process has terminated
    pub fn from_process(process: &Process) -> Option<Self> {
        if process.state != ProcessState::Terminated {
            return None;
        }
        let start_time = process.start_time?;
        let completion_time = process.completion_time?;
        let turnaround_time = completion_time.saturating_sub(process.arrival_time);

        Some(Self {
            pid: process.pid,
            name: process.name.clone(),
            arrival_time: process.arrival_time,
            burst_time: process.burst_time,
            priority: process.priority,
            start_time,
            completion_time,
            waiting_time: turnaround_time.saturating_sub(process.burst_time),
            turnaround_time,
            response_time: start_time.saturating_sub(process.arrival_time),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Busy ticks over total ticks, in `0.0..=1.0`
    pub cpu_utilization: f64,
    /// Processes completed per tick
    pub throughput: f64,
}

fn mean(values: impl Iterator<Item = Ticks>) -> f64 {
    values.map(|v| v as f64).collect::<Mean>().estimate()
}

/// Aggregate statistics. Idle and context-switch ticks count as not busy.
pub fn summarize(reports: &[ProcessReport], log: &ExecutionLog) -> Metrics {
    let total_ticks = log.len() as f64;
    if reports.is_empty() || total_ticks == 0.0 {
        return Metrics::default();
    }

    Metrics {
        avg_waiting_time: mean(reports.iter().map(|r| r.waiting_time)),
        avg_turnaround_time: mean(reports.iter().map(|r| r.turnaround_time)),
        avg_response_time: mean(reports.iter().map(|r| r.response_time)),
        cpu_utilization: log.busy_ticks() as f64 / total_ticks,
        throughput: reports.len() as f64 / total_ticks,
    }
}

/// Rank runs by average waiting time, best first. Ties keep input order.
pub fn compare<'a, I>(runs: I) -> Vec<(&'a str, Metrics)>
where
    I: IntoIterator<Item = (&'a str, Metrics)>,
{
    let mut ranked: Vec<_> = runs.into_iter().collect();
    ranked.sort_by(|a, b| a.1.avg_waiting_time.total_cmp(&b.1.avg_waiting_time));
    ranked
}
