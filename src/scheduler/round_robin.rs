use std::num::NonZeroU64;

use super::{BurstOutcome, Scheduler, dispatch_next, run_slot};
use crate::core::{SimCtx, SlotId, Ticks};

const CPU: SlotId = 0;

/// Round-robin over a FIFO ready queue. A process that exhausts its quantum
/// without completing or blocking goes to the tail of the ready queue.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    quantum: NonZeroU64,
    quantum_left: Ticks,
}

impl RoundRobinScheduler {
    pub fn new(quantum: NonZeroU64) -> Self {
        Self {
            quantum,
            quantum_left: quantum.get(),
        }
    }

    // Every dispatch starts a fresh quantum
    fn dispatch(&mut self, ctx: &mut SimCtx) {
        if dispatch_next(ctx, CPU).is_some() {
            self.quantum_left = self.quantum.get();
        }
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn tick(&mut self, ctx: &mut SimCtx) {
        let Some(outcome) = run_slot(ctx, CPU) else {
            self.dispatch(ctx);
            return;
        };
        self.quantum_left = self.quantum_left.saturating_sub(1);

        match outcome {
            BurstOutcome::Completed => {
                ctx.terminate(CPU);
                self.dispatch(ctx);
            }
            BurstOutcome::Blocked => {
                ctx.block(CPU);
                self.dispatch(ctx);
            }
            BurstOutcome::Continue if self.quantum_left == 0 => {
                ctx.preempt(CPU);
                self.dispatch(ctx);
            }
            BurstOutcome::Continue => {}
        }
    }
}
