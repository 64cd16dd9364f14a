use average::{Estimate, Mean};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::Process;

/// Mean wait and turnaround over the terminated processes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean_wait_time: f64,
    pub mean_turnaround_time: f64,
    pub processes: usize,
}

impl Statistics {
    /// `None` when nothing terminated, so an empty run never reports a NaN.
    pub fn from_terminated<'a>(processes: impl IntoIterator<Item = &'a Process>) -> Option<Self> {
        let mut wait = Mean::new();
        let mut turnaround = Mean::new();
        let mut count = 0;
        for process in processes {
            let (Some(w), Some(t)) = (process.wait_time, process.turnaround_time) else {
                continue;
            };
            wait.add(w as f64);
            turnaround.add(t as f64);
            count += 1;
        }

        if count == 0 {
            return None;
        }
        Some(Self {
            mean_wait_time: wait.mean(),
            mean_turnaround_time: turnaround.mean(),
            processes: count,
        })
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average waiting time: {:.2}, Average turnaround time: {:.2}",
            self.mean_wait_time, self.mean_turnaround_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProcState;
    use crate::sim::ProcessProfile;

    fn finished(id: usize, wait: u64, turnaround: u64) -> Process {
        Process {
            id,
            profile: ProcessProfile {
                pid: id as u32,
                arrival_time: 0,
                total_cpu_time: turnaround - wait,
                io_frequency: 0,
                io_duration: 0,
                priority: 0,
                memory_required: 0,
            },
            state: ProcState::Terminated,
            current_slot: None,
            cpu_remaining: 0,
            io_countdown: 0,
            wait_time: Some(wait),
            turnaround_time: Some(turnaround),
        }
    }

    #[test]
    fn test_means() {
        let procs = [finished(0, 0, 5), finished(1, 4, 8), finished(2, 2, 2)];
        let stats = Statistics::from_terminated(&procs).unwrap();
        assert_eq!(stats.processes, 3);
        assert_eq!(stats.mean_wait_time, 2.0);
        assert_eq!(stats.mean_turnaround_time, 5.0);
        assert_eq!(
            stats.to_string(),
            "Average waiting time: 2.00, Average turnaround time: 5.00"
        );
    }

    #[test]
    fn test_empty_run_has_no_statistics() {
        let none: [Process; 0] = [];
        assert_eq!(Statistics::from_terminated(&none), None);
    }
}
