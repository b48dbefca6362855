use super::{Running, Scheduler, SliceStatus};
use crate::{
    core::{
        QueueId,
        state::{Pid, SimCtx, Ticks},
    },
    error::InvariantViolation,
};
use rustc_hash::FxHashMap;

/// FIFO circular queue with a fixed time quantum.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    queue: QueueId,
    quantum: Ticks,
    // Ticks left in the current slice of each dispatched process
    slices: FxHashMap<Pid, Ticks>,
}

impl RoundRobinScheduler {
    pub fn init(ctx: &mut SimCtx, quantum: Ticks) -> Self {
        debug_assert!(quantum > 0, "quantum must be validated before init");
        Self {
            queue: ctx.create_queue_fifo(),
            quantum,
            slices: FxHashMap::default(),
        }
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }

    pub fn slice_left(&self, pid: Pid) -> Option<Ticks> {
        self.slices.get(&pid).copied()
    }

    fn start_slice(&mut self, pid: Pid) -> Pid {
        self.slices.insert(pid, self.quantum);
        pid
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> String {
        format!("rr(q={})", self.quantum)
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) -> Result<(), InvariantViolation> {
        ctx.queue_push_back(self.queue, pid)
    }

    fn select_next(
        &mut self,
        ctx: &mut SimCtx,
        current: Option<Running>,
    ) -> Result<Option<Pid>, InvariantViolation> {
        if let Some(running) = current {
            if !running.slice_expired {
                return Ok(Some(running.pid));
            }
        }

        match ctx.queue_pop(self.queue) {
            Some(next) => Ok(Some(self.start_slice(next))),
            // Nobody else is ready: the expired process goes again with a fresh slice
            None => Ok(current.map(|running| self.start_slice(running.pid))),
        }
    }

    fn has_ready(&self, ctx: &SimCtx) -> bool {
        ctx.queue_len(self.queue) > 0
    }

    fn tick(&mut self, pid: Pid) -> SliceStatus {
        let left = self.slices.entry(pid).or_insert(self.quantum);
        *left = left.saturating_sub(1);
        if *left == 0 {
            SliceStatus::Expired
        } else {
            SliceStatus::Continue
        }
    }

    fn retire(&mut self, pid: Pid) {
        self.slices.remove(&pid);
    }
}
