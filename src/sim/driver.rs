use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use super::profile::{ProcessProfile, validate_profiles};
use super::stats::Statistics;
use crate::{
    config::Policy,
    core::{
        driver::SchedCore,
        event::{LOG_HEADER, MEMORY_LOG_HEADER, TransitionLog},
        state::Ticks,
    },
    error::SimError,
    scheduler::{
        FcfsScheduler, PartitionedScheduler, PriorityScheduler, RoundRobinScheduler, Scheduler,
    },
};

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
}

impl<S: Scheduler> Sim<S> {
    /// Processes enter the NEW queue in table order, which is the tie-break
    /// order for arrivals and FIFO dispatch.
    pub fn new(profiles: &[ProcessProfile], scheduler: S) -> Self {
        let mut core = SchedCore::new(scheduler);
        for profile in profiles {
            core.add_process(*profile);
        }
        Self { core }
    }

    pub fn step(&mut self) {
        self.core.tick();
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.is_finished()
    }

    /// Run until every process has terminated, or fail once `budget` ticks
    /// have elapsed without getting there.
    pub fn run(mut self, budget: Option<Ticks>) -> Result<Outcome, SimError> {
        log::debug!(
            "{} policy driving {} processes over {} slot(s)",
            self.core.scheduler.name(),
            self.core.ctx.tasks.len(),
            self.core.ctx.slots.len()
        );
        loop {
            if let Some(budget) = budget {
                if self.core.now() >= budget {
                    return Err(SimError::TickBudgetExceeded { budget });
                }
            }
            self.step();
            if self.all_jobs_completed() {
                break;
            }
        }

        let ctx = self.core.ctx;
        let statistics = Statistics::from_terminated(ctx.terminated.iter().map(|&t| ctx.task(t)));
        Ok(Outcome {
            elapsed: ctx.now,
            terminated: ctx.terminated.len(),
            statistics,
            log: ctx.log,
        })
    }
}

/// What a single run produced, independent of the policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub elapsed: Ticks,
    pub terminated: usize,
    pub statistics: Option<Statistics>,
    pub log: TransitionLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub policy: Policy,
    pub elapsed: Ticks,
    pub terminated: usize,
    pub statistics: Option<Statistics>,
    pub log: TransitionLog,
}

impl Report {
    fn new(policy: Policy, outcome: Outcome) -> Self {
        Self {
            policy,
            elapsed: outcome.elapsed,
            terminated: outcome.terminated,
            statistics: outcome.statistics,
            log: outcome.log,
        }
    }

    pub fn write_csv<W: Write>(&self, out: W) -> io::Result<()> {
        let header = match self.policy {
            Policy::MemoryPartitioned { .. } => MEMORY_LOG_HEADER,
            _ => LOG_HEADER,
        };
        self.log.write_csv(out, header)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statistics {
            Some(stats) => write!(f, "{stats}"),
            None => f.write_str("no processes"),
        }
    }
}

/// Validate the inputs, then simulate `profiles` under `policy` to completion.
pub fn run(profiles: &[ProcessProfile], policy: &Policy) -> Result<Report, SimError> {
    run_with_budget(profiles, policy, None)
}

pub fn run_with_budget(
    profiles: &[ProcessProfile],
    policy: &Policy,
    budget: Option<Ticks>,
) -> Result<Report, SimError> {
    validate_profiles(profiles)?;
    policy.validate(profiles)?;

    log::info!("{} scheduler over {} processes", policy, profiles.len());
    let outcome = match *policy {
        Policy::Fcfs => Sim::new(profiles, FcfsScheduler).run(budget)?,
        Policy::Priority { preemption } => {
            Sim::new(profiles, PriorityScheduler::new(preemption)).run(budget)?
        }
        Policy::RoundRobin { quantum } => {
            Sim::new(profiles, RoundRobinScheduler::new(quantum)).run(budget)?
        }
        Policy::MemoryPartitioned { partitions } => {
            Sim::new(profiles, PartitionedScheduler::new(partitions)).run(budget)?
        }
    };
    log::info!(
        "finished after {} ticks, {} transitions",
        outcome.elapsed,
        outcome.log.len()
    );

    Ok(Report::new(*policy, outcome))
}
