use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use crate::core::{Pid, ProcState, Ticks};

/// Aggregate memory figures at the moment a process entered a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    // Sum of the occupants' memory requirements
    pub memory_used: u64,
    pub memory_free: u64,
    // Total memory minus the capacity of every occupied partition
    pub usable_memory: u64,
    pub partition_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub tick: Ticks,
    pub pid: Pid,
    pub from: ProcState,
    pub to: ProcState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemorySnapshot>,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.tick, self.pid, self.from, self.to)?;
        if let Some(mem) = &self.memory {
            write!(
                f,
                ",{},{},{},Partition {}",
                mem.memory_used, mem.memory_free, mem.usable_memory, mem.partition_size
            )?;
        }
        Ok(())
    }
}

pub const LOG_HEADER: &str = "Time of transition, PID, Old State, New State";
pub const MEMORY_LOG_HEADER: &str = "Time of transition, PID, Old State, New State, Total Memory Used, Total Memory Free, Total Usable Memory, Partition Size";

/// Append-only, tick-ordered record of every state change in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionLog {
    entries: Vec<Transition>,
}

impl TransitionLog {
    pub fn push(&mut self, entry: Transition) {
        assert!(
            self.entries.last().is_none_or(|last| last.tick <= entry.tick),
            "Transition at t={} appended after t={}",
            entry.tick,
            self.entries.last().map_or(0, |last| last.tick)
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Transition] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for a single process, in log order.
    pub fn for_pid(&self, pid: Pid) -> impl Iterator<Item = &Transition> {
        self.entries.iter().filter(move |entry| entry.pid == pid)
    }

    pub fn write_csv<W: Write>(&self, mut out: W, header: &str) -> io::Result<()> {
        writeln!(out, "{header}")?;
        for entry in &self.entries {
            writeln!(out, "{entry}")?;
        }
        out.flush()
    }
}

impl<'a> IntoIterator for &'a TransitionLog {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
