use serde::{Deserialize, Serialize};

use crate::config::TOTAL_MEMORY;
use crate::core::{MemorySnapshot, SlotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub capacity: u64,
    pub occupied: bool,
}

/// Fixed partitions, indexed by the running slot they back. Capacities are
/// validated against `TOTAL_MEMORY` before the run and never again.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
    memory_used: u64,
    partition_memory_used: u64,
}

impl PartitionTable {
    pub fn new(capacities: &[u64]) -> Self {
        Self {
            partitions: capacities
                .iter()
                .map(|&capacity| Partition {
                    capacity,
                    occupied: false,
                })
                .collect(),
            memory_used: 0,
            partition_memory_used: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partition(&self, slot: SlotId) -> &Partition {
        &self.partitions[slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }

    pub fn largest(&self) -> u64 {
        self.partitions.iter().map(|p| p.capacity).max().unwrap_or(0)
    }

    pub fn memory_used(&self) -> u64 {
        self.memory_used
    }

    pub fn partition_memory_used(&self) -> u64 {
        self.partition_memory_used
    }

    pub fn occupy(&mut self, slot: SlotId, required: u64) -> MemorySnapshot {
        let partition = &mut self.partitions[slot];
        debug_assert!(!partition.occupied, "Partition {slot} already occupied");
        debug_assert!(required <= partition.capacity);
        partition.occupied = true;
        self.partition_memory_used += partition.capacity;
        self.memory_used += required;
        self.snapshot(slot)
    }

    pub fn release(&mut self, slot: SlotId, required: u64) {
        let partition = &mut self.partitions[slot];
        debug_assert!(partition.occupied, "Partition {slot} is already free");
        partition.occupied = false;
        self.partition_memory_used -= partition.capacity;
        self.memory_used -= required;
    }

    pub fn snapshot(&self, slot: SlotId) -> MemorySnapshot {
        MemorySnapshot {
            memory_used: self.memory_used,
            memory_free: TOTAL_MEMORY.saturating_sub(self.memory_used),
            usable_memory: TOTAL_MEMORY.saturating_sub(self.partition_memory_used),
            partition_size: self.partitions[slot].capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_release_track_totals() {
        let mut table = PartitionTable::new(&[100, 200, 300, 400]);
        let snap = table.occupy(1, 150);
        assert_eq!(snap.memory_used, 150);
        assert_eq!(snap.memory_free, 850);
        assert_eq!(snap.usable_memory, 800);
        assert_eq!(snap.partition_size, 200);

        let snap = table.occupy(3, 10);
        assert_eq!(snap.memory_used, 160);
        assert_eq!(snap.usable_memory, 400);
        assert_eq!(table.partition_memory_used(), 600);

        table.release(1, 150);
        assert_eq!(table.memory_used(), 10);
        assert_eq!(table.partition_memory_used(), 400);
        assert!(!table.partition(1).occupied);
        assert!(table.partition(3).occupied);
    }

    #[test]
    fn test_largest() {
        let table = PartitionTable::new(&[250, 50, 600, 100]);
        assert_eq!(table.largest(), 600);
        assert_eq!(PartitionTable::new(&[]).largest(), 0);
    }
}
