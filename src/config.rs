use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

use crate::error::ConfigError;
use crate::scheduler::PartitionTable;
use crate::sim::ProcessProfile;

/// Memory available to the partition table, in size units.
pub const TOTAL_MEMORY: u64 = 1000;
pub const PARTITION_COUNT: usize = 4;

/// Where a process displaced by a more urgent one goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreemptionMode {
    /// Back to the tail of the ready queue, logged RUNNING -> READY.
    #[default]
    Requeue,
    /// Logged RUNNING -> WAITING and parked on the waiting queue until its
    /// I/O countdown runs out. Matches logs produced by older tooling.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Policy {
    Fcfs,
    Priority { preemption: PreemptionMode },
    RoundRobin { quantum: NonZeroU64 },
    MemoryPartitioned { partitions: [u64; PARTITION_COUNT] },
}

impl Policy {
    /// Resolve a policy from its selector (`1`..`4` or its name) and the
    /// positional parameters that follow it.
    pub fn from_args(selector: &str, params: &[&str]) -> Result<Self, ConfigError> {
        match selector.to_ascii_lowercase().as_str() {
            "1" | "fcfs" => Ok(Self::Fcfs),
            "2" | "priority" => Ok(Self::Priority {
                preemption: PreemptionMode::default(),
            }),
            "3" | "rr" | "round-robin" => {
                let raw = params
                    .first()
                    .ok_or(ConfigError::MissingParameter("time quantum"))?;
                let quantum = parse_u64(raw, "time quantum")?;
                let quantum = NonZeroU64::new(quantum).ok_or(ConfigError::ZeroQuantum)?;
                Ok(Self::RoundRobin { quantum })
            }
            "4" | "memory" => {
                if params.len() < PARTITION_COUNT {
                    return Err(ConfigError::MissingParameter("four partition sizes"));
                }
                let mut partitions = [0; PARTITION_COUNT];
                for (size, raw) in partitions.iter_mut().zip(params) {
                    *size = parse_u64(raw, "partition size")?;
                }
                Ok(Self::MemoryPartitioned { partitions })
            }
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }

    pub fn with_preemption(self, mode: PreemptionMode) -> Self {
        match self {
            Self::Priority { .. } => Self::Priority { preemption: mode },
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "First Come First Serve",
            Self::Priority { .. } => "Priority",
            Self::RoundRobin { .. } => "Round Robin",
            Self::MemoryPartitioned { .. } => "Memory Partitioned First Fit",
        }
    }

    /// Every configuration check, run once before the simulation starts.
    pub fn validate(&self, profiles: &[ProcessProfile]) -> Result<(), ConfigError> {
        let Self::MemoryPartitioned { partitions } = self else {
            return Ok(());
        };

        let total: u64 = partitions.iter().sum();
        if total > TOTAL_MEMORY {
            return Err(ConfigError::PartitionOverflow {
                total,
                limit: TOTAL_MEMORY,
            });
        }

        let largest = PartitionTable::new(partitions).largest();
        if let Some(profile) = profiles.iter().find(|p| p.memory_required > largest) {
            return Err(ConfigError::UnplaceableProcess {
                pid: profile.pid,
                required: profile.memory_required,
                largest,
            });
        }

        log::debug!("partition table {partitions:?} accepted ({total}/{TOTAL_MEMORY} units)");
        Ok(())
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin { quantum } => write!(f, "{} (quantum {quantum})", self.name()),
            Self::MemoryPartitioned { partitions } => {
                write!(f, "{} (partitions {partitions:?})", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

fn parse_u64(raw: &str, parameter: &'static str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidParameter {
            parameter,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs(pid: u32, memory: u64) -> ProcessProfile {
        ProcessProfile {
            pid,
            arrival_time: 0,
            total_cpu_time: 1,
            io_frequency: 0,
            io_duration: 0,
            priority: 0,
            memory_required: memory,
        }
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Policy::from_args("1", &[]), Ok(Policy::Fcfs));
        assert_eq!(
            Policy::from_args("priority", &[]),
            Ok(Policy::Priority {
                preemption: PreemptionMode::Requeue
            })
        );
        assert_eq!(
            Policy::from_args("3", &["4"]),
            Ok(Policy::RoundRobin {
                quantum: NonZeroU64::new(4).unwrap()
            })
        );
        assert_eq!(
            Policy::from_args("memory", &["100", "200", "300", "400"]),
            Ok(Policy::MemoryPartitioned {
                partitions: [100, 200, 300, 400]
            })
        );
    }

    #[test]
    fn test_selector_errors() {
        assert_eq!(
            Policy::from_args("7", &[]),
            Err(ConfigError::UnknownPolicy("7".into()))
        );
        assert_eq!(
            Policy::from_args("rr", &[]),
            Err(ConfigError::MissingParameter("time quantum"))
        );
        assert_eq!(Policy::from_args("rr", &["0"]), Err(ConfigError::ZeroQuantum));
        assert!(matches!(
            Policy::from_args("rr", &["two"]),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Policy::from_args("4", &["1", "2"]),
            Err(ConfigError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_partition_bound() {
        let policy = Policy::MemoryPartitioned {
            partitions: [500, 300, 150, 51],
        };
        assert_eq!(
            policy.validate(&[]),
            Err(ConfigError::PartitionOverflow {
                total: 1001,
                limit: TOTAL_MEMORY
            })
        );

        let exact = Policy::MemoryPartitioned {
            partitions: [500, 300, 150, 50],
        };
        assert_eq!(exact.validate(&[needs(1, 500)]), Ok(()));
    }

    #[test]
    fn test_unplaceable_process_rejected() {
        let policy = Policy::MemoryPartitioned {
            partitions: [100, 100, 100, 100],
        };
        assert_eq!(
            policy.validate(&[needs(1, 50), needs(2, 101)]),
            Err(ConfigError::UnplaceableProcess {
                pid: 2,
                required: 101,
                largest: 100
            })
        );
    }

    #[test]
    fn test_with_preemption_only_touches_priority() {
        let legacy = Policy::from_args("2", &[])
            .unwrap()
            .with_preemption(PreemptionMode::Legacy);
        assert_eq!(
            legacy,
            Policy::Priority {
                preemption: PreemptionMode::Legacy
            }
        );
        assert_eq!(
            Policy::Fcfs.with_preemption(PreemptionMode::Legacy),
            Policy::Fcfs
        );
    }
}
