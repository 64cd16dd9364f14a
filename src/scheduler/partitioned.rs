use super::{BurstOutcome, PartitionTable, Scheduler, run_slot};
use crate::config::PARTITION_COUNT;
use crate::core::SimCtx;

/// First-fit scheduling over fixed memory partitions, one running slot per
/// partition.
///
/// Partitions are visited in table order each tick. A free partition takes
/// the first ready process (in queue order) that fits; an occupied one runs
/// its occupant for a tick and is freed on completion or I/O block. A freed
/// partition is not refilled until the next tick.
#[derive(Debug)]
pub struct PartitionedScheduler {
    table: PartitionTable,
}

impl PartitionedScheduler {
    pub fn new(capacities: [u64; PARTITION_COUNT]) -> Self {
        Self {
            table: PartitionTable::new(&capacities),
        }
    }

    pub fn table(&self) -> &PartitionTable {
        &self.table
    }
}

impl Scheduler for PartitionedScheduler {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn slots(&self) -> usize {
        self.table.len()
    }

    fn tick(&mut self, ctx: &mut SimCtx) {
        for slot in 0..self.table.len() {
            debug_assert_eq!(
                self.table.partition(slot).occupied,
                !ctx.slot_is_idle(slot),
                "Partition {slot} occupancy disagrees with its running slot"
            );

            let Some(outcome) = run_slot(ctx, slot) else {
                let capacity = self.table.partition(slot).capacity;
                if let Some(task) = ctx.ready_take_first(|p| p.profile.memory_required <= capacity) {
                    let snapshot = self
                        .table
                        .occupy(slot, ctx.task(task).profile.memory_required);
                    ctx.dispatch(slot, task, Some(snapshot));
                }
                continue;
            };

            match outcome {
                BurstOutcome::Completed => {
                    let task = ctx.terminate(slot);
                    self.table.release(slot, ctx.task(task).profile.memory_required);
                }
                BurstOutcome::Blocked => {
                    let task = ctx.block(slot);
                    self.table.release(slot, ctx.task(task).profile.memory_required);
                }
                BurstOutcome::Continue => {}
            }
        }
    }
}
