use super::{Scheduler, single_slot_tick};
use crate::core::SimCtx;

/// First-come-first-serve: the ready queue is strictly FIFO and a process
/// keeps the CPU until it completes or blocks on I/O.
#[derive(Debug, Default)]
pub struct FcfsScheduler;

impl Scheduler for FcfsScheduler {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn tick(&mut self, ctx: &mut SimCtx) {
        single_slot_tick(ctx);
    }
}
