pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod logger;
pub mod scheduler;
pub mod sim;

pub use config::{PARTITION_COUNT, Policy, PreemptionMode, TOTAL_MEMORY};
pub use crate::core::{MemorySnapshot, ProcState, Transition, TransitionLog};
pub use error::{ConfigError, InputError, SimError};
pub use scheduler::Scheduler;
pub use sim::{ProcessProfile, Report, Sim, Statistics, run, run_with_budget};
