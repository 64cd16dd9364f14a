use super::state::{ProcState, QueueKind, SimCtx};

/// Audits the queue-ownership invariant after every tick: each process is
/// owned by exactly one queue or exactly one running slot.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;

        for slot in &ctx.slots {
            if let Some(task_id) = slot.current {
                let task = ctx.task(task_id);
                debug_assert_eq!(
                    task.state,
                    ProcState::Running,
                    "slot.current task {task_id} must be Running"
                );
                debug_assert_eq!(
                    task.current_slot,
                    Some(slot.id),
                    "Task {task_id} metadata current_slot mismatch"
                );
                debug_assert!(
                    !ctx.task_to_queue.contains_key(&task_id),
                    "Running task {task_id} must not appear in any queue"
                );
            }
        }

        for (&task_id, &queue) in &ctx.task_to_queue {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                queue.state(),
                "Task {task_id} in {queue:?} has state {:?}",
                task.state
            );
            let present = match queue {
                QueueKind::New => ctx.new.contains(&task_id),
                QueueKind::Ready => ctx.ready.contains(task_id),
                QueueKind::Waiting => ctx.waiting.contains(&task_id),
                QueueKind::Terminated => ctx.terminated.contains(&task_id),
            };
            debug_assert!(
                present,
                "task_to_queue claims task {task_id} in {queue:?}, but queue does not contain it"
            );
        }

        let running = ctx.slots.iter().filter(|slot| slot.current.is_some()).count();
        let queued = ctx.new.len() + ctx.ready.len() + ctx.waiting.len() + ctx.terminated.len();
        debug_assert_eq!(
            running + queued,
            ctx.tasks.len(),
            "Step {}: {} processes owned but {} exist",
            self.step,
            running + queued,
            ctx.tasks.len()
        );
        debug_assert_eq!(
            ctx.task_to_queue.len(),
            queued,
            "Membership map out of sync with queue contents"
        );
    }
}
