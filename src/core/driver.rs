use super::{
    observer::Observer,
    state::{SimCtx, TaskId, Ticks},
};
use crate::scheduler::Scheduler;
use crate::sim::profile::ProcessProfile;

/// The tick engine. Owns the simulation state and drives one policy.
pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(scheduler: S) -> Self {
        let ctx = SimCtx::new(scheduler.slots(), scheduler.discipline());
        Self {
            ctx,
            scheduler,
            observer: Observer::new(),
        }
    }

    pub fn add_process(&mut self, profile: ProcessProfile) -> TaskId {
        self.ctx.create_task(profile)
    }

    /// Run one tick at the current time, then advance the clock.
    ///
    /// Pass order within a tick is fixed: the policy's pre-tick hook, I/O
    /// completion, arrivals, then the policy's dispatch/execution pass.
    pub fn tick(&mut self) {
        self.scheduler.before_tick(&mut self.ctx);
        self.ctx.complete_io();
        self.ctx.admit_arrivals();
        self.scheduler.tick(&mut self.ctx);
        self.observer.observe(&self.ctx);
        self.ctx.advance_time(1);
    }

    pub fn is_finished(&self) -> bool {
        self.ctx.is_drained()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ProcState;
    use crate::scheduler::FcfsScheduler;

    fn profile(pid: u32, arrival: Ticks, cpu: Ticks) -> ProcessProfile {
        ProcessProfile {
            pid,
            arrival_time: arrival,
            total_cpu_time: cpu,
            io_frequency: 0,
            io_duration: 0,
            priority: 0,
            memory_required: 0,
        }
    }

    #[test]
    fn test_tick_advances_clock_and_audits() {
        let mut core = SchedCore::new(FcfsScheduler);
        let id = core.add_process(profile(1, 2, 1));
        assert!(!core.is_finished());

        core.tick();
        core.tick();
        assert_eq!(core.now(), 2);
        assert_eq!(core.ctx.task(id).state, ProcState::New);

        core.tick();
        assert_eq!(core.ctx.running(0), Some(id));
        core.tick();
        assert!(core.is_finished());
        assert_eq!(core.observer().steps(), 4);
        assert_eq!(core.ctx.task(id).turnaround_time, Some(1));
        assert_eq!(core.ctx.task(id).wait_time, Some(0));
    }

    #[test]
    fn test_arrival_logged_before_dispatch() {
        let mut core = SchedCore::new(FcfsScheduler);
        core.add_process(profile(5, 0, 2));
        core.tick();
        let log = core.ctx.log.entries();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].from, log[0].to), (ProcState::New, ProcState::Ready));
        assert_eq!((log[1].from, log[1].to), (ProcState::Ready, ProcState::Running));
    }
}
