use rand::prelude::*;

use super::profile::ProcessProfile;
use crate::core::state::{Pid, Ticks};

/// Shape of a synthetic process table.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadParams {
    // Ticks over which arrivals are drawn
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub max_io_frequency: Ticks,
    pub max_io_duration: Ticks,
    pub max_priority: i32,
    pub max_memory: u64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            ticks: 50,
            p_arrival: 0.3,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            max_io_frequency: 5,
            max_io_duration: 3,
            max_priority: 5,
            max_memory: 250,
        }
    }
}

/// Bernoulli arrivals: each tick independently spawns a process with
/// probability `p_arrival`, short with probability `p_short`. The same seed
/// always produces the same table.
pub fn bernoulli_profiles(params: &WorkloadParams, seed: u64) -> Vec<ProcessProfile> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut profiles = Vec::new();

    for t in 0..params.ticks {
        if rng.random::<f64>() < params.p_arrival {
            let total_cpu_time = if rng.random::<f64>() < params.p_short {
                params.short_ticks
            } else {
                params.long_ticks
            };

            profiles.push(ProcessProfile {
                pid: profiles.len() as Pid + 1,
                arrival_time: t,
                total_cpu_time: total_cpu_time.max(1),
                io_frequency: rng.random_range(0..=params.max_io_frequency),
                io_duration: rng.random_range(1..=params.max_io_duration.max(1)),
                priority: rng.random_range(0..=params.max_priority.max(0)),
                memory_required: rng.random_range(0..=params.max_memory),
            });
        }
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::profile::validate_profiles;

    #[test]
    fn test_same_seed_same_table() {
        let params = WorkloadParams::default();
        assert_eq!(bernoulli_profiles(&params, 7), bernoulli_profiles(&params, 7));
    }

    #[test]
    fn test_negative_priority_bound_clamps_to_zero() {
        let params = WorkloadParams {
            p_arrival: 1.0,
            max_priority: -3,
            ..WorkloadParams::default()
        };
        let profiles = bernoulli_profiles(&params, 2);
        assert!(!profiles.is_empty());
        assert!(profiles.iter().all(|p| p.priority == 0));
    }

    #[test]
    fn test_generated_table_is_valid() {
        let params = WorkloadParams {
            p_arrival: 1.0,
            ..WorkloadParams::default()
        };
        let profiles = bernoulli_profiles(&params, 3);
        assert_eq!(profiles.len(), params.ticks as usize);
        assert!(validate_profiles(&profiles).is_ok());
        assert!(profiles.iter().all(|p| p.memory_required <= params.max_memory));
        assert!(
            profiles
                .windows(2)
                .all(|w| w[0].arrival_time < w[1].arrival_time)
        );
    }
}
