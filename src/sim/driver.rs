use super::{
    job::{Job, validate_workload},
    metrics::{Metrics, ProcessReport, summarize},
};
use crate::{
    config::SchedulerConfig,
    core::{
        ExecutionLog, SimEvent,
        driver::{SchedCore, StepOutcome},
        state::{Process, SimCtx, Ticks},
    },
    error::SimError,
    scheduler::{self, Scheduler},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SimOutcome {
    pub scheduler: String,
    pub processes: Vec<ProcessReport>,
    pub log: ExecutionLog,
    pub metrics: Metrics,
    pub total_ticks: Ticks,
    pub context_switches: u64,
}

pub struct Sim<S: Scheduler = Box<dyn Scheduler>> {
    pub core: SchedCore<S>,
    // Index of the next process to admit; ctx.processes is sorted by arrival
    job_cursor: usize,
    started: bool,
}

impl Sim {
    /// Validate the workload and configuration and set up a run.
    pub fn new(jobs: Vec<Job>, config: &SchedulerConfig) -> Result<Self, SimError> {
        config.validate()?;
        validate_workload(&jobs, config.queue_levels())?;

        let processes = jobs
            .into_iter()
            .map(Job::into_process)
            .collect::<Result<Vec<_>, _>>()?;
        let mut ctx = SimCtx::new(processes);
        let scheduler = scheduler::build(config, &mut ctx)?;

        Ok(Self::with_scheduler(ctx, scheduler, config.overhead_ticks()?))
    }
}

impl<S: Scheduler> Sim<S> {
    pub fn with_scheduler(ctx: SimCtx, scheduler: S, context_switch_overhead: Ticks) -> Self {
        Self {
            core: SchedCore::new(ctx, scheduler, context_switch_overhead),
            job_cursor: 0,
            started: false,
        }
    }

    pub fn state(&self) -> RunState {
        if !self.started {
            RunState::NotStarted
        } else if self.all_jobs_completed() {
            RunState::Completed
        } else {
            RunState::Running
        }
    }

    /// Admit arrivals, then advance the core by one decision.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        self.start();
        if self.all_jobs_completed() {
            return Ok(StepOutcome::default());
        }

        let arrivals = self.handle_arrivals()?;
        let mut outcome = self.core.step()?;
        if !arrivals.is_empty() {
            outcome.events.splice(0..0, arrivals);
        }
        Ok(outcome)
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            scheduler = %self.core.scheduler.name(),
            processes = self.core.ctx.processes.len(),
            "simulation started"
        );
    }

    fn handle_arrivals(&mut self) -> Result<Vec<SimEvent>, SimError> {
        let now = self.core.now();
        let mut events = Vec::new();
        // Contiguous, since processes are sorted by (arrival_time, pid)
        while let Some(process) = self.core.ctx.processes.get(self.job_cursor) {
            if process.arrival_time > now {
                break;
            }
            let pid = process.pid;
            events.push(self.core.admit(pid)?);
            self.job_cursor += 1;
        }
        Ok(events)
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.all_terminated()
    }

    /// Run until every process has terminated.
    pub fn run(&mut self) -> Result<SimOutcome, SimError> {
        self.start();
        while !self.all_jobs_completed() {
            self.step()?;
        }
        let outcome = self.outcome();
        info!(
            scheduler = %outcome.scheduler,
            total_ticks = outcome.total_ticks,
            context_switches = outcome.context_switches,
            "simulation completed"
        );
        Ok(outcome)
    }

    /// Run until every process has terminated or the clock reaches `limit`.
    pub fn run_until(&mut self, limit: Ticks) -> Result<RunState, SimError> {
        self.start();
        while !self.all_jobs_completed() && self.core.now() < limit {
            self.step()?;
        }
        Ok(self.state())
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn processes(&self) -> &[Process] {
        &self.core.ctx.processes
    }

    /// Reports for the processes terminated so far, ordered by pid.
    pub fn reports(&self) -> Vec<ProcessReport> {
        let mut reports: Vec<ProcessReport> = self
            .core
            .ctx
            .processes
            .iter()
            .filter_map(ProcessReport::from_process)
            .collect();
        reports.sort_by_key(|r| r.pid);
        reports
    }

    pub fn outcome(&self) -> SimOutcome {
        let processes = self.reports();
        let log = self.core.log().clone();
        SimOutcome {
            scheduler: self.core.scheduler.name(),
            metrics: summarize(&processes, &log),
            total_ticks: self.core.now(),
            context_switches: self.core.context_switches(),
            processes,
            log,
        }
    }
}
