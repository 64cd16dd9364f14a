use super::{Scheduler, single_slot_tick};
use crate::config::PreemptionMode;
use crate::core::{Discipline, SimCtx, SlotId};

/// Priority scheduling. Dispatch takes the highest-priority ready process,
/// earliest-inserted first among equals. At the start of every tick a running
/// process is displaced if a strictly more urgent one is ready.
#[derive(Debug, Default)]
pub struct PriorityScheduler {
    preemption: PreemptionMode,
}

impl PriorityScheduler {
    pub fn new(preemption: PreemptionMode) -> Self {
        Self { preemption }
    }
}

impl Scheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn discipline(&self) -> Discipline {
        Discipline::Priority
    }

    fn before_tick(&mut self, ctx: &mut SimCtx) {
        const CPU: SlotId = 0;

        let Some(current) = ctx.running(CPU) else {
            return;
        };
        let Some(best) = ctx.ready_peek_priority() else {
            return;
        };
        let current_priority = ctx.task(current).profile.priority;
        if best <= current_priority {
            return;
        }

        let Some(next) = ctx.ready_pop() else {
            return;
        };
        log::debug!(
            "t={} pid {} (priority {}) displaces pid {} (priority {})",
            ctx.now,
            ctx.task(next).pid(),
            best,
            ctx.task(current).pid(),
            current_priority
        );
        match self.preemption {
            PreemptionMode::Requeue => ctx.preempt(CPU),
            PreemptionMode::Legacy => ctx.park(CPU),
        };
        ctx.dispatch(CPU, next, None);
    }

    fn tick(&mut self, ctx: &mut SimCtx) {
        single_slot_tick(ctx);
    }
}
