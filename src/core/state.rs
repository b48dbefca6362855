use crate::error::InvariantViolation;
use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::{cmp::Ordering, collections::VecDeque};

pub type Pid = u64;
pub type Ticks = u64;
new_key_type! {
    pub struct QueueId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    New,
    Ready,
    Running,
    // Reserved for I/O modeling; no policy moves a process here.
    Waiting,
    Terminated,
}

/// Ordering key of a keyed run queue: `(primary, arrival_time, pid)`, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub primary: i64,
    pub arrival_time: Ticks,
    pub pid: Pid,
}

impl SelectionKey {
    pub fn new(primary: i64, process: &Process) -> Self {
        Self {
            primary,
            arrival_time: process.arrival_time,
            pid: process.pid,
        }
    }

    fn as_tuple(&self) -> (i64, Ticks, Pid) {
        (self.primary, self.arrival_time, self.pid)
    }

    /// True if `self` would be selected before `other`.
    pub fn precedes(&self, other: &Self) -> bool {
        self.as_tuple() < other.as_tuple()
    }
}

// KeyedPriorityQueue is a max-heap, so the smallest tuple must compare greatest
impl PartialOrd for SelectionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SelectionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other.as_tuple().cmp(&self.as_tuple())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub name: Option<String>,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: i64,
    pub queue_level: Option<usize>,

    pub remaining_time: Ticks,
    pub state: ProcessState,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl Process {
    pub fn new(pid: Pid, arrival_time: Ticks, burst_time: Ticks, priority: i64) -> Self {
        Self {
            pid,
            name: None,
            arrival_time,
            burst_time,
            priority,
            queue_level: None,
            remaining_time: burst_time,
            state: ProcessState::New,
            start_time: None,
            completion_time: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.remaining_time == 0
    }

    fn transition(&mut self, from: ProcessState, to: ProcessState) -> Result<(), InvariantViolation> {
        if self.state != from {
            return Err(InvariantViolation::IllegalTransition {
                pid: self.pid,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn admit(&mut self) -> Result<(), InvariantViolation> {
        self.transition(ProcessState::New, ProcessState::Ready)
    }

    pub fn dispatch(&mut self) -> Result<(), InvariantViolation> {
        if self.state == ProcessState::Terminated {
            return Err(InvariantViolation::TerminatedReselected(self.pid));
        }
        self.transition(ProcessState::Ready, ProcessState::Running)
    }

    pub fn preempt(&mut self) -> Result<(), InvariantViolation> {
        self.transition(ProcessState::Running, ProcessState::Ready)
    }

    /// Execute one tick starting at `now`. `start_time` is only recorded on the first call.
    pub fn run_tick(&mut self, now: Ticks) -> Result<(), InvariantViolation> {
        if self.state != ProcessState::Running {
            return Err(InvariantViolation::IllegalTransition {
                pid: self.pid,
                from: self.state,
                to: ProcessState::Running,
            });
        }
        self.remaining_time = self
            .remaining_time
            .checked_sub(1)
            .ok_or(InvariantViolation::RemainingUnderflow(self.pid))?;
        self.start_time.get_or_insert(now);
        Ok(())
    }

    pub fn terminate(&mut self, now: Ticks) -> Result<(), InvariantViolation> {
        self.transition(ProcessState::Running, ProcessState::Terminated)?;
        self.completion_time = Some(now);
        Ok(())
    }
}

#[derive(Debug)]
pub enum RunQueue {
    Fifo {
        pids: VecDeque<Pid>,
    },
    Keyed {
        pids: KeyedPriorityQueue<Pid, SelectionKey>,
    },
}

impl RunQueue {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            pids: VecDeque::new(),
        }
    }

    pub fn new_keyed() -> Self {
        Self::Keyed {
            pids: KeyedPriorityQueue::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { pids } => pids.len(),
            Self::Keyed { pids } => pids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queued pids, in no particular order for keyed queues.
    pub fn pids(&self) -> Box<dyn Iterator<Item = Pid> + '_> {
        match self {
            Self::Fifo { pids } => Box::new(pids.iter().copied()),
            Self::Keyed { pids } => Box::new(pids.iter().map(|(pid, _)| *pid)),
        }
    }
}

/// Process table and ready structures of one run.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    // Sorted by (arrival_time, pid)
    pub processes: Vec<Process>,
    pub queues: SlotMap<QueueId, RunQueue>,
    pub pid_to_queue: FxHashMap<Pid, QueueId>,
    index: FxHashMap<Pid, usize>,
}

impl SimCtx {
    pub fn new(mut processes: Vec<Process>) -> Self {
        processes.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.pid.cmp(&b.pid))
        });
        let index = processes
            .iter()
            .enumerate()
            .map(|(i, process)| (process.pid, i))
            .collect();

        Self {
            now: 0,
            processes,
            queues: SlotMap::with_key(),
            pid_to_queue: FxHashMap::default(),
            index,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn process(&self, pid: Pid) -> Result<&Process, InvariantViolation> {
        self.index
            .get(&pid)
            .map(|&i| &self.processes[i])
            .ok_or(InvariantViolation::UnknownPid(pid))
    }

    pub fn process_mut(&mut self, pid: Pid) -> Result<&mut Process, InvariantViolation> {
        match self.index.get(&pid) {
            Some(&i) => Ok(&mut self.processes[i]),
            None => Err(InvariantViolation::UnknownPid(pid)),
        }
    }

    pub fn create_queue_fifo(&mut self) -> QueueId {
        self.queues.insert(RunQueue::new_fifo())
    }

    pub fn create_queue_keyed(&mut self) -> QueueId {
        self.queues.insert(RunQueue::new_keyed())
    }

    fn queue_push(
        &mut self,
        queue_id: QueueId,
        pid: Pid,
        key: Option<SelectionKey>,
    ) -> Result<(), InvariantViolation> {
        if self.pid_to_queue.contains_key(&pid) {
            return Err(InvariantViolation::AlreadyQueued(pid));
        }

        let process = self.process(pid)?;
        if process.state != ProcessState::Ready {
            return Err(InvariantViolation::QueuedNotReady {
                pid,
                state: process.state,
            });
        }
        // A keyed queue without an explicit key falls back to arrival order
        let key = key.unwrap_or_else(|| SelectionKey::new(process.arrival_time as i64, process));

        match self.queues.get_mut(queue_id) {
            Some(RunQueue::Fifo { pids }) => pids.push_back(pid),
            Some(RunQueue::Keyed { pids }) => {
                pids.push(pid, key);
            }
            None => return Err(InvariantViolation::UnknownQueue(pid)),
        }

        self.pid_to_queue.insert(pid, queue_id);
        Ok(())
    }

    pub fn queue_push_back(&mut self, queue_id: QueueId, pid: Pid) -> Result<(), InvariantViolation> {
        self.queue_push(queue_id, pid, None)
    }

    pub fn queue_push_keyed(
        &mut self,
        queue_id: QueueId,
        pid: Pid,
        key: SelectionKey,
    ) -> Result<(), InvariantViolation> {
        self.queue_push(queue_id, pid, Some(key))
    }

    pub fn queue_pop(&mut self, queue_id: QueueId) -> Option<Pid> {
        let queue = self.queues.get_mut(queue_id)?;
        let pid = match queue {
            RunQueue::Fifo { pids } => pids.pop_front(),
            RunQueue::Keyed { pids } => pids.pop().map(|(pid, _)| pid),
        }?;

        self.pid_to_queue.remove(&pid);
        Some(pid)
    }

    /// Key of the entry a keyed queue would pop next.
    pub fn queue_peek_key(&self, queue_id: QueueId) -> Option<SelectionKey> {
        match self.queues.get(queue_id)? {
            RunQueue::Fifo { .. } => None,
            RunQueue::Keyed { pids } => pids.peek().map(|(_, key)| *key),
        }
    }

    pub fn queue_len(&self, queue_id: QueueId) -> usize {
        self.queues.get(queue_id).map_or(0, RunQueue::len)
    }

    pub fn pid_in_any_queue(&self, pid: Pid) -> bool {
        self.pid_to_queue.contains_key(&pid)
    }

    pub fn all_terminated(&self) -> bool {
        self.processes
            .iter()
            .all(|process| process.state == ProcessState::Terminated)
    }
}
