use thiserror::Error;

use crate::core::{Pid, Ticks};

/// Problems with the policy selection or its parameters, found before a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown scheduling policy `{0}` (expected 1/fcfs, 2/priority, 3/rr or 4/memory)")]
    UnknownPolicy(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value `{value}` for {parameter}")]
    InvalidParameter { parameter: &'static str, value: String },

    #[error("Time quantum must be at least one tick")]
    ZeroQuantum,

    #[error("Partition sizes sum to {total}, exceeding the {limit}-unit memory bound")]
    PartitionOverflow { total: u64, limit: u64 },

    #[error("Process {pid} requires {required} units but the largest partition holds {largest}")]
    UnplaceableProcess { pid: Pid, required: u64, largest: u64 },
}

/// Malformed or inconsistent process table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read process table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process table is empty (expected a header line)")]
    MissingHeader,

    #[error("Line {line}: expected 7 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("Line {line}: invalid {field} `{value}`")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Process {pid} requires zero CPU time")]
    ZeroCpuTime { pid: Pid },

    #[error("Duplicate process id {pid}")]
    DuplicatePid { pid: Pid },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Simulation did not finish within {budget} ticks")]
    TickBudgetExceeded { budget: Ticks },
}
