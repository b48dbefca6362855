use super::{
    event::SimEvent,
    log::{ExecutionLog, Slot},
    observer::Observer,
    state::{Pid, ProcessState, SimCtx, Ticks},
};
use crate::{
    error::InvariantViolation,
    scheduler::{Running, Scheduler, SliceStatus},
};
use tracing::{debug, trace};

/// Result of one `SchedCore::step`.
#[derive(Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<SimEvent>,
    pub completed: Vec<Pid>,
}

pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    current: Option<Pid>,
    // Last process to occupy the CPU, kept across idle ticks and terminations
    last_ran: Option<Pid>,
    slice_expired: bool,
    context_switch_overhead: Ticks,
    context_switches: u64,
    log: ExecutionLog,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(ctx: SimCtx, scheduler: S, context_switch_overhead: Ticks) -> Self {
        Self {
            ctx,
            scheduler,
            current: None,
            last_ran: None,
            slice_expired: false,
            context_switch_overhead,
            context_switches: 0,
            log: ExecutionLog::new(),
            observer: Observer::new(),
        }
    }

    /// New -> Ready, then hand the process to the scheduler.
    pub fn admit(&mut self, pid: Pid) -> Result<SimEvent, InvariantViolation> {
        self.ctx.process_mut(pid)?.admit()?;
        self.scheduler
            .enqueue(&mut self.ctx, pid)?;
        trace!(pid, now = self.ctx.now, "admitted");
        Ok(SimEvent::StateChange {
            pid,
            from: ProcessState::New,
            to: ProcessState::Ready,
        })
    }

    /// Decide, switch, execute and retire for a single tick.
    pub fn step(&mut self) -> Result<StepOutcome, InvariantViolation> {
        let mut outcome = StepOutcome::default();

        let running = self.current.map(|pid| Running {
            pid,
            slice_expired: self.slice_expired,
        });
        let chosen = self.scheduler.select_next(&mut self.ctx, running)?;
        self.slice_expired = false;

        if chosen != self.current {
            self.switch_to(chosen, &mut outcome.events)?;
        }

        match self.current {
            Some(pid) => self.execute(pid, &mut outcome)?,
            None => {
                self.log.push(self.ctx.now, Slot::IDLE);
                self.ctx.advance_time(1);
                outcome.events.push(SimEvent::CpuIdle);
            }
        }

        self.observer.observe(&self.ctx, self.current)?;
        Ok(outcome)
    }

    fn switch_to(
        &mut self,
        next: Option<Pid>,
        events: &mut Vec<SimEvent>,
    ) -> Result<(), InvariantViolation> {
        let prev = self.current.take();
        if let Some(prev) = prev {
            self.ctx.process_mut(prev)?.preempt()?;
            self.scheduler
                .enqueue(&mut self.ctx, prev)?;
            debug!(pid = prev, now = self.ctx.now, "preempted");
            events.push(SimEvent::StateChange {
                pid: prev,
                from: ProcessState::Running,
                to: ProcessState::Ready,
            });
        }

        let Some(next) = next else {
            events.push(SimEvent::CpuCurrentChange {
                from: prev,
                to: None,
            });
            return Ok(());
        };

        if let Some(last) = self.last_ran.filter(|&last| last != next) {
            self.context_switches += 1;
            for _ in 0..self.context_switch_overhead {
                self.log.push(self.ctx.now, Slot::SWITCH);
                self.ctx.advance_time(1);
            }
            debug!(
                from = last,
                to = next,
                overhead = self.context_switch_overhead,
                "context switch"
            );
            events.push(SimEvent::ContextSwitch {
                from: last,
                to: next,
                overhead: self.context_switch_overhead,
            });
        }

        self.ctx.process_mut(next)?.dispatch()?;
        self.current = Some(next);
        self.last_ran = Some(next);
        debug!(pid = next, now = self.ctx.now, "dispatched");
        events.push(SimEvent::StateChange {
            pid: next,
            from: ProcessState::Ready,
            to: ProcessState::Running,
        });
        events.push(SimEvent::CpuCurrentChange {
            from: prev,
            to: Some(next),
        });
        Ok(())
    }

    fn execute(&mut self, pid: Pid, outcome: &mut StepOutcome) -> Result<(), InvariantViolation> {
        let now = self.ctx.now;
        self.ctx.process_mut(pid)?.run_tick(now)?;
        self.log.push(now, Slot::Run(pid));
        self.ctx.advance_time(1);
        trace!(pid, tick = now, "executed");

        if self.ctx.process(pid)?.is_terminated() {
            let completion = self.ctx.now;
            self.ctx.process_mut(pid)?.terminate(completion)?;
            self.scheduler.retire(pid);
            self.current = None;
            debug!(pid, completion, "terminated");
            outcome.events.push(SimEvent::StateChange {
                pid,
                from: ProcessState::Running,
                to: ProcessState::Terminated,
            });
            outcome.completed.push(pid);
            return Ok(());
        }

        if self.scheduler.tick(pid) == SliceStatus::Expired {
            trace!(pid, "slice expired");
            self.slice_expired = true;
        }
        Ok(())
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
