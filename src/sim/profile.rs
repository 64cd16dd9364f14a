use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::state::{Pid, Ticks};
use crate::error::InputError;

/// Static description of one process, as read from the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessProfile {
    pub pid: Pid,
    pub arrival_time: Ticks,
    pub total_cpu_time: Ticks,
    // CPU ticks between I/O events; zero means the process never blocks
    pub io_frequency: Ticks,
    pub io_duration: Ticks,
    // Higher is more urgent
    pub priority: i32,
    pub memory_required: u64,
}

/// Reject tables the engine cannot make progress on: a zero CPU burst never
/// completes and a repeated pid makes the log ambiguous.
pub fn validate_profiles(profiles: &[ProcessProfile]) -> Result<(), InputError> {
    let mut seen = FxHashSet::default();
    for profile in profiles {
        if profile.total_cpu_time == 0 {
            return Err(InputError::ZeroCpuTime { pid: profile.pid });
        }
        if !seen.insert(profile.pid) {
            return Err(InputError::DuplicatePid { pid: profile.pid });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pid: Pid, cpu: Ticks) -> ProcessProfile {
        ProcessProfile {
            pid,
            arrival_time: 0,
            total_cpu_time: cpu,
            io_frequency: 0,
            io_duration: 0,
            priority: 0,
            memory_required: 0,
        }
    }

    #[test]
    fn test_validate_profiles() {
        assert!(validate_profiles(&[]).is_ok());
        assert!(validate_profiles(&[profile(1, 3), profile(2, 1)]).is_ok());
        assert!(matches!(
            validate_profiles(&[profile(1, 3), profile(2, 0)]),
            Err(InputError::ZeroCpuTime { pid: 2 })
        ));
        assert!(matches!(
            validate_profiles(&[profile(4, 3), profile(4, 1)]),
            Err(InputError::DuplicatePid { pid: 4 })
        ));
    }
}
