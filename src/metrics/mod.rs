//! Core measurement types shared across the monitor

use std::fmt;

/// Kind of statement a probe exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Read,
    Write,
    Update,
}

impl QueryKind {
    /// Tag stored in the `query_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Read => "SELECT",
            QueryKind::Write => "INSERT",
            QueryKind::Update => "UPDATE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed probe.
///
/// `exec_time` is the wall-clock seconds spent obtaining the statement's
/// plan, not the statement's own runtime. The capture timestamp is assigned
/// at persistence time by the datastore.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub query_kind: QueryKind,
    /// Seconds spent obtaining the plan, >= 0
    pub exec_time: f64,
    /// Planner estimate of rows scanned, not an execution counter
    pub rows_examined: u64,
    /// Reserved for lock-wait instrumentation; always 0 for now
    pub lock_time: f64,
}

/// One row of the hourly aggregate read consumed by the report generator
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyBucket {
    /// Hour of day, 0..=23
    pub hour: u32,
    pub avg_exec_time: f64,
    pub max_rows_examined: u64,
}
