use super::state::{Pid, ProcessState, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    StateChange {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },
    CpuCurrentChange {
        from: Option<Pid>,
        to: Option<Pid>,
    },
    // Overhead ticks charged to the clock, not to any process
    ContextSwitch {
        from: Pid,
        to: Pid,
        overhead: Ticks,
    },
    // CPU idle even after select_next()
    CpuIdle,
}
