pub mod driver;
pub mod profile;
pub mod stats;
pub mod workload;

pub use driver::{Outcome, Report, Sim, run, run_with_budget};
pub use profile::{ProcessProfile, validate_profiles};
pub use stats::Statistics;
pub use workload::{WorkloadParams, bernoulli_profiles};
