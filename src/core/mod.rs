pub mod driver;
pub mod event;
pub mod log;
pub mod observer;
pub mod state;

pub use driver::{SchedCore, StepOutcome};
pub use event::SimEvent;
pub use log::{ExecutionLog, LogEntry, Marker, Segment, Slot};
pub use state::{Pid, Process, ProcessState, QueueId, RunQueue, SelectionKey, SimCtx, Ticks};
