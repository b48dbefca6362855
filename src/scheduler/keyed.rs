use super::{Running, Scheduler};
use crate::{
    core::{
        QueueId, SelectionKey,
        state::{Pid, Process, SimCtx},
    },
    error::InvariantViolation,
};

/// Primary component of the selection key; ties break on `(arrival_time, pid)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Arrival,
    RemainingTime,
    Priority,
}

impl OrderBy {
    pub fn key(&self, process: &Process) -> SelectionKey {
        let primary = match self {
            Self::Arrival => process.arrival_time as i64,
            Self::RemainingTime => process.remaining_time as i64,
            Self::Priority => process.priority,
        };
        SelectionKey::new(primary, process)
    }
}

/// Min-key selection over a single keyed run queue.
///
/// Covers FCFS, SJF, SRTF and both Priority modes. A non-preemptive instance
/// never takes the CPU from a running process; a preemptive one does so as
/// soon as a ready process has a strictly smaller key.
#[derive(Debug)]
pub struct KeyedScheduler {
    queue: QueueId,
    order: OrderBy,
    preemptive: bool,
    name: &'static str,
}

impl KeyedScheduler {
    pub fn init(ctx: &mut SimCtx, order: OrderBy, preemptive: bool, name: &'static str) -> Self {
        Self {
            queue: ctx.create_queue_keyed(),
            order,
            preemptive,
            name,
        }
    }

    pub fn fcfs(ctx: &mut SimCtx) -> Self {
        Self::init(ctx, OrderBy::Arrival, false, "fcfs")
    }

    pub fn sjf(ctx: &mut SimCtx) -> Self {
        Self::init(ctx, OrderBy::RemainingTime, false, "sjf")
    }

    pub fn srtf(ctx: &mut SimCtx) -> Self {
        Self::init(ctx, OrderBy::RemainingTime, true, "srtf")
    }

    pub fn priority(ctx: &mut SimCtx, preemptive: bool) -> Self {
        let name = if preemptive {
            "priority_preemptive"
        } else {
            "priority"
        };
        Self::init(ctx, OrderBy::Priority, preemptive, name)
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }
}

impl Scheduler for KeyedScheduler {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) -> Result<(), InvariantViolation> {
        let key = self.order.key(ctx.process(pid)?);
        ctx.queue_push_keyed(self.queue, pid, key)
    }

    fn select_next(
        &mut self,
        ctx: &mut SimCtx,
        current: Option<Running>,
    ) -> Result<Option<Pid>, InvariantViolation> {
        let Some(running) = current else {
            return Ok(ctx.queue_pop(self.queue));
        };
        if !self.preemptive {
            return Ok(Some(running.pid));
        }

        let running_key = self.order.key(ctx.process(running.pid)?);
        match ctx.queue_peek_key(self.queue) {
            Some(best) if best.precedes(&running_key) => Ok(ctx.queue_pop(self.queue)),
            _ => Ok(Some(running.pid)),
        }
    }

    fn has_ready(&self, ctx: &SimCtx) -> bool {
        ctx.queue_len(self.queue) > 0
    }
}
