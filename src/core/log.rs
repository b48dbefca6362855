use crate::core::{Pid, Ticks};
use serde::{Deserialize, Serialize};

/// What occupied the CPU during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    Run(Pid),
    Marker(Marker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Idle,
    Switch,
}

impl Slot {
    pub const IDLE: Slot = Slot::Marker(Marker::Idle);
    pub const SWITCH: Slot = Slot::Marker(Marker::Switch);

    pub fn pid(&self) -> Option<Pid> {
        match self {
            Slot::Run(pid) => Some(*pid),
            Slot::Marker(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tick: Ticks,
    // Serialized as `{"tick": 3, "pid": 7}`, with "idle" or "switch" in place of a pid
    #[serde(rename = "pid")]
    pub slot: Slot,
}

/// Half-open interval `[start, end)` during which `slot` held the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Ticks,
    pub end: Ticks,
    pub slot: Slot,
}

/// Append-only, one entry per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Ticks, slot: Slot) {
        debug_assert!(
            self.entries.last().is_none_or(|last| last.tick < tick),
            "log ticks must strictly increase"
        );
        self.entries.push(LogEntry { tick, slot });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn busy_ticks(&self) -> Ticks {
        self.entries.iter().filter(|e| e.slot.pid().is_some()).count() as Ticks
    }

    pub fn count(&self, slot: Slot) -> Ticks {
        self.entries.iter().filter(|e| e.slot == slot).count() as Ticks
    }

    /// Pids in execution order, one per tick, skipping idle and switch ticks.
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().filter_map(|e| e.slot.pid())
    }

    /// Collapse consecutive ticks with the same slot into Gantt segments.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        for entry in &self.entries {
            match segments.last_mut() {
                Some(last) if last.slot == entry.slot && last.end == entry.tick => {
                    last.end = entry.tick + 1;
                }
                _ => segments.push(Segment {
                    start: entry.tick,
                    end: entry.tick + 1,
                    slot: entry.slot,
                }),
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_segments_merge_contiguous_ticks() {
        let mut log = ExecutionLog::new();
        for (tick, slot) in [
            (0, Slot::Run(1)),
            (1, Slot::Run(1)),
            (2, Slot::SWITCH),
            (3, Slot::Run(2)),
            (4, Slot::IDLE),
            (5, Slot::IDLE),
            (6, Slot::Run(2)),
        ] {
            log.push(tick, slot);
        }

        assert_eq!(
            log.segments(),
            vec![
                Segment { start: 0, end: 2, slot: Slot::Run(1) },
                Segment { start: 2, end: 3, slot: Slot::SWITCH },
                Segment { start: 3, end: 4, slot: Slot::Run(2) },
                Segment { start: 4, end: 6, slot: Slot::IDLE },
                Segment { start: 6, end: 7, slot: Slot::Run(2) },
            ]
        );
        assert_eq!(log.busy_ticks(), 4);
        assert_eq!(log.count(Slot::IDLE), 2);
        assert_eq!(log.pids().collect::<Vec<_>>(), vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_log_serializes_pid_or_marker() {
        let mut log = ExecutionLog::new();
        log.push(0, Slot::Run(4));
        log.push(1, Slot::IDLE);
        log.push(2, Slot::SWITCH);

        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(
            json,
            r#"[{"tick":0,"pid":4},{"tick":1,"pid":"idle"},{"tick":2,"pid":"switch"}]"#
        );
    }
}
