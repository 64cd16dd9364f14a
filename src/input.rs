//! Process-table text format.
//!
//! The first line is a header and is ignored. Every following non-empty line
//! holds seven comma-separated integers:
//! `pid,arrival,cpu,io_frequency,io_duration,priority,memory`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::InputError;
use crate::sim::ProcessProfile;

pub const TABLE_HEADER: &str =
    "PID,Arrival Time,Total CPU Time,I/O Frequency,I/O Duration,Priority,Memory";

const FIELDS: [&str; 7] = [
    "pid",
    "arrival time",
    "total CPU time",
    "I/O frequency",
    "I/O duration",
    "priority",
    "memory requirement",
];

pub fn load_table(path: impl AsRef<Path>) -> Result<Vec<ProcessProfile>, InputError> {
    let text = fs::read_to_string(path)?;
    parse_table(&text)
}

pub fn parse_table(text: &str) -> Result<Vec<ProcessProfile>, InputError> {
    let mut lines = text.lines().enumerate();
    lines.next().ok_or(InputError::MissingHeader)?;

    let mut profiles = Vec::new();
    for (index, row) in lines {
        let line = index + 1;
        if row.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != FIELDS.len() {
            return Err(InputError::FieldCount {
                line,
                found: fields.len(),
            });
        }

        profiles.push(ProcessProfile {
            pid: field(&fields, 0, line)?,
            arrival_time: field(&fields, 1, line)?,
            total_cpu_time: field(&fields, 2, line)?,
            io_frequency: field(&fields, 3, line)?,
            io_duration: field(&fields, 4, line)?,
            priority: field(&fields, 5, line)?,
            memory_required: field(&fields, 6, line)?,
        });
    }

    log::debug!("parsed {} processes", profiles.len());
    Ok(profiles)
}

fn field<T: FromStr>(fields: &[&str], index: usize, line: usize) -> Result<T, InputError> {
    fields[index].parse().map_err(|_| InputError::InvalidField {
        line,
        field: FIELDS[index],
        value: fields[index].to_string(),
    })
}

pub fn write_table<W: Write>(mut out: W, profiles: &[ProcessProfile]) -> io::Result<()> {
    writeln!(out, "{TABLE_HEADER}")?;
    for p in profiles {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            p.pid,
            p.arrival_time,
            p.total_cpu_time,
            p.io_frequency,
            p.io_duration,
            p.priority,
            p.memory_required
        )?;
    }
    out.flush()
}
