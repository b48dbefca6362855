pub mod keyed;
pub mod multilevel;
pub mod round_robin;

use crate::{
    config::{Algorithm, SchedulerConfig, quantum_ticks},
    core::{
        Ticks,
        state::{Pid, SimCtx},
    },
    error::{ConfigError, InvariantViolation},
};
pub use keyed::{KeyedScheduler, OrderBy};
pub use multilevel::MultilevelScheduler;
pub use round_robin::RoundRobinScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    Continue,
    Expired,
}

/// The process currently holding the CPU, as seen by `select_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Running {
    pub pid: Pid,
    // Set after the quantum ran out on the previous tick
    pub slice_expired: bool,
}

impl Running {
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            slice_expired: false,
        }
    }
}

/// A scheduling policy.
///
/// `select_next` returns the process that should hold the CPU for the next
/// tick. If the returned pid differs from `current`, the scheduler has
/// already removed it from its ready structures and the driver hands the
/// previous process back through `enqueue`. `None` means the CPU idles,
/// which only happens when nothing is ready and nothing runs.
pub trait Scheduler {
    fn name(&self) -> String;

    /// Take a Ready process, either newly admitted or just preempted.
    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) -> Result<(), InvariantViolation>;

    fn select_next(
        &mut self,
        ctx: &mut SimCtx,
        current: Option<Running>,
    ) -> Result<Option<Pid>, InvariantViolation>;

    fn has_ready(&self, ctx: &SimCtx) -> bool;

    // Called after `pid` executed one tick and did not terminate
    fn tick(&mut self, _pid: Pid) -> SliceStatus {
        SliceStatus::Continue
    }

    // Drop per-process state once `pid` terminates
    fn retire(&mut self, _pid: Pid) {}
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) -> Result<(), InvariantViolation> {
        (**self).enqueue(ctx, pid)
    }

    fn select_next(
        &mut self,
        ctx: &mut SimCtx,
        current: Option<Running>,
    ) -> Result<Option<Pid>, InvariantViolation> {
        (**self).select_next(ctx, current)
    }

    fn has_ready(&self, ctx: &SimCtx) -> bool {
        (**self).has_ready(ctx)
    }

    fn tick(&mut self, pid: Pid) -> SliceStatus {
        (**self).tick(pid)
    }

    fn retire(&mut self, pid: Pid) {
        (**self).retire(pid)
    }
}

/// Build the scheduler described by `config`, creating its run queues in `ctx`.
pub fn build(config: &SchedulerConfig, ctx: &mut SimCtx) -> Result<Box<dyn Scheduler>, ConfigError> {
    config.validate()?;
    match config.algorithm {
        Algorithm::Multilevel => Ok(Box::new(MultilevelScheduler::init(ctx, &config.levels)?)),
        algorithm => build_single(ctx, algorithm, config.quantum),
    }
}

pub(crate) fn build_single(
    ctx: &mut SimCtx,
    algorithm: Algorithm,
    quantum: Option<i64>,
) -> Result<Box<dyn Scheduler>, ConfigError> {
    let scheduler: Box<dyn Scheduler> = match algorithm {
        Algorithm::Fcfs => Box::new(KeyedScheduler::fcfs(ctx)),
        Algorithm::Sjf => Box::new(KeyedScheduler::sjf(ctx)),
        Algorithm::Srtf => Box::new(KeyedScheduler::srtf(ctx)),
        Algorithm::Priority => Box::new(KeyedScheduler::priority(ctx, false)),
        Algorithm::PriorityPreemptive => Box::new(KeyedScheduler::priority(ctx, true)),
        Algorithm::RoundRobin => {
            let quantum: Ticks = quantum_ticks(quantum)?;
            Box::new(RoundRobinScheduler::init(ctx, quantum))
        }
        Algorithm::Multilevel => return Err(ConfigError::NestedMultilevel(0)),
    };
    Ok(scheduler)
}
