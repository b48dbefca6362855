use super::{Running, Scheduler, SliceStatus, build_single};
use crate::{
    config::LevelConfig,
    core::state::{Pid, Process, SimCtx},
    error::{ConfigError, InvariantViolation},
};
use rustc_hash::FxHashMap;

/// Fixed-level queues with strict priority between levels.
///
/// Each level owns a complete scheduler of its own. A process is pinned to
/// one level at arrival and never migrates. A ready process at a higher
/// level (lower index) takes the CPU from a process running at a lower one.
pub struct MultilevelScheduler {
    levels: Vec<Box<dyn Scheduler>>,
    level_of: FxHashMap<Pid, usize>,
}

impl MultilevelScheduler {
    pub fn init(ctx: &mut SimCtx, configs: &[LevelConfig]) -> Result<Self, ConfigError> {
        if configs.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        let levels = configs
            .iter()
            .map(|level| build_single(ctx, level.algorithm, level.quantum))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            levels,
            level_of: FxHashMap::default(),
        })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Explicit `queue_level` if set, else the priority clamped to the level range.
    pub fn assign_level(&self, process: &Process) -> usize {
        let last = self.levels.len() - 1;
        match process.queue_level {
            Some(level) => level.min(last),
            None => process.priority.clamp(0, last as i64) as usize,
        }
    }

    pub fn level_of(&self, pid: Pid) -> Option<usize> {
        self.level_of.get(&pid).copied()
    }

    fn highest_ready(&self, ctx: &SimCtx) -> Option<usize> {
        self.levels.iter().position(|level| level.has_ready(ctx))
    }

    fn level_index(&self, pid: Pid) -> Result<usize, InvariantViolation> {
        self.level_of(pid).ok_or(InvariantViolation::UnknownPid(pid))
    }
}

impl Scheduler for MultilevelScheduler {
    fn name(&self) -> String {
        let names: Vec<String> = self.levels.iter().map(|level| level.name()).collect();
        format!("multilevel[{}]", names.join(", "))
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) -> Result<(), InvariantViolation> {
        let level = match self.level_of(pid) {
            Some(level) => level,
            None => {
                let level = self.assign_level(ctx.process(pid)?);
                self.level_of.insert(pid, level);
                level
            }
        };
        self.levels[level].enqueue(ctx, pid)
    }

    fn select_next(
        &mut self,
        ctx: &mut SimCtx,
        current: Option<Running>,
    ) -> Result<Option<Pid>, InvariantViolation> {
        let top = self.highest_ready(ctx);
        let Some(running) = current else {
            return match top {
                Some(level) => self.levels[level].select_next(ctx, None),
                None => Ok(None),
            };
        };

        let running_level = self.level_index(running.pid)?;
        match top {
            Some(level) if level < running_level => self.levels[level].select_next(ctx, None),
            _ => self.levels[running_level].select_next(ctx, Some(running)),
        }
    }

    fn has_ready(&self, ctx: &SimCtx) -> bool {
        self.highest_ready(ctx).is_some()
    }

    fn tick(&mut self, pid: Pid) -> SliceStatus {
        match self.level_of(pid) {
            Some(level) => self.levels[level].tick(pid),
            None => SliceStatus::Continue,
        }
    }

    fn retire(&mut self, pid: Pid) {
        if let Some(level) = self.level_of.remove(&pid) {
            self.levels[level].retire(pid);
        }
    }
}
