pub mod fcfs;
pub mod partition;
pub mod partitioned;
pub mod priority;
pub mod round_robin;

use crate::core::state::{Discipline, SimCtx, SlotId, TaskId};
pub use fcfs::FcfsScheduler;
pub use partition::{Partition, PartitionTable};
pub use partitioned::PartitionedScheduler;
pub use priority::PriorityScheduler;
pub use round_robin::RoundRobinScheduler;

/// What happened to a running process during one tick of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstOutcome {
    Continue,
    Completed,
    Blocked,
}

/// A scheduling policy, driven once per tick by the engine after the I/O
/// completion and arrival passes.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Number of running slots the policy manages.
    fn slots(&self) -> usize {
        1
    }

    /// Ordering of the ready queue.
    fn discipline(&self) -> Discipline {
        Discipline::Fifo
    }

    /// Runs before the I/O completion pass.
    fn before_tick(&mut self, _ctx: &mut SimCtx) {}

    /// Dispatch, execution and preemption for the current tick.
    fn tick(&mut self, ctx: &mut SimCtx);
}

/// Execute the process on `slot` for one tick. Completion is checked before
/// the I/O block, so a process whose counters both run out finishes.
pub fn run_slot(ctx: &mut SimCtx, slot: SlotId) -> Option<BurstOutcome> {
    let task_id = ctx.running(slot)?;
    let task = ctx.task_mut(task_id);
    let io_due = task.consume_tick();

    if task.cpu_remaining == 0 {
        Some(BurstOutcome::Completed)
    } else if io_due {
        Some(BurstOutcome::Blocked)
    } else {
        Some(BurstOutcome::Continue)
    }
}

/// Move the next ready process onto `slot`, if there is one.
pub fn dispatch_next(ctx: &mut SimCtx, slot: SlotId) -> Option<TaskId> {
    let task = ctx.ready_pop()?;
    ctx.dispatch(slot, task, None);
    Some(task)
}

/// The single-slot tick shared by FCFS and priority: an idle CPU takes the
/// next ready process; a busy one executes and, on completion or I/O block,
/// hands the CPU straight to the next ready process.
pub(crate) fn single_slot_tick(ctx: &mut SimCtx) -> Option<BurstOutcome> {
    const CPU: SlotId = 0;

    let Some(outcome) = run_slot(ctx, CPU) else {
        dispatch_next(ctx, CPU);
        return None;
    };

    match outcome {
        BurstOutcome::Completed => {
            ctx.terminate(CPU);
            dispatch_next(ctx, CPU);
        }
        BurstOutcome::Blocked => {
            ctx.block(CPU);
            dispatch_next(ctx, CPU);
        }
        BurstOutcome::Continue => {}
    }
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU64;

    use crate::config::PreemptionMode;

    #[test]
    fn test_policy_shapes() {
        let rr = RoundRobinScheduler::new(NonZeroU64::new(3).unwrap());
        let memory = PartitionedScheduler::new([100, 200, 300, 400]);
        let priority = PriorityScheduler::new(PreemptionMode::Requeue);

        assert_eq!(FcfsScheduler.name(), "fcfs");
        assert_eq!(priority.name(), "priority");
        assert_eq!(rr.name(), "rr");
        assert_eq!(memory.name(), "memory");

        assert_eq!(FcfsScheduler.slots(), 1);
        assert_eq!(memory.slots(), 4);
        assert_eq!(priority.discipline(), Discipline::Priority);
        assert_eq!(rr.discipline(), Discipline::Fifo);
    }
}
