use super::state::{Pid, ProcessState, SimCtx, Ticks};
use crate::error::InvariantViolation;
use rustc_hash::FxHashSet;

/// Checks run-wide invariants after every tick.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx, current: Option<Pid>) -> Result<(), InvariantViolation> {
        self.step += 1;

        if ctx.now < self.last_now {
            return Err(InvariantViolation::ClockRegression {
                from: self.last_now,
                to: ctx.now,
            });
        }
        self.last_now = ctx.now;

        if let Some(pid) = current {
            let process = ctx.process(pid)?;
            if process.state != ProcessState::Running {
                return Err(InvariantViolation::IllegalTransition {
                    pid,
                    from: process.state,
                    to: ProcessState::Running,
                });
            }
            if ctx.pid_in_any_queue(pid) {
                return Err(InvariantViolation::RunningWhileQueued(pid));
            }
        }

        for process in &ctx.processes {
            if process.remaining_time > process.burst_time {
                return Err(InvariantViolation::RemainingExceedsBurst(process.pid));
            }
            // Only the current process may be Running
            if process.state == ProcessState::Running && current != Some(process.pid) {
                return Err(InvariantViolation::StrayRunning(process.pid));
            }
        }

        // Queue contents and pid_to_queue must agree entry for entry
        let mut queued = FxHashSet::default();
        for (queue_id, queue) in &ctx.queues {
            for pid in queue.pids() {
                if !queued.insert(pid) {
                    return Err(InvariantViolation::AlreadyQueued(pid));
                }
                if ctx.pid_to_queue.get(&pid) != Some(&queue_id) {
                    return Err(InvariantViolation::QueueIndexMismatch(pid));
                }
                let state = ctx.process(pid)?.state;
                if state != ProcessState::Ready {
                    return Err(InvariantViolation::QueuedNotReady { pid, state });
                }
            }
        }
        if queued.len() != ctx.pid_to_queue.len() {
            if let Some(&pid) = ctx.pid_to_queue.keys().find(|pid| !queued.contains(*pid)) {
                return Err(InvariantViolation::QueueIndexMismatch(pid));
            }
        }

        Ok(())
    }
}
