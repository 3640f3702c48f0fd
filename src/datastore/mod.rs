//! Datastore collaborator boundary
//!
//! The monitor talks to exactly one datastore over one long-lived
//! connection: explain requests for the probes, appends to the measurement
//! log, and the hourly aggregate read that feeds the daily report. Trait
//! methods take `&mut self` so access stays serial by construction.

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::{MySqlConfig, MySqlStore};

use async_trait::async_trait;

use crate::metrics::{HourlyBucket, Measurement};

/// Datastore errors
#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("unexpected result shape: {0}")]
    Decode(String),
}

/// The single-connection datastore the monitor probes and logs through
#[async_trait]
pub trait Datastore: Send {
    /// Run `EXPLAIN FORMAT=JSON` for a statement, returning the raw payload
    async fn explain(&mut self, statement: &str) -> Result<String, DatastoreError>;

    /// Append one measurement to the durable log
    async fn append(&mut self, measurement: &Measurement) -> Result<(), DatastoreError>;

    /// Per-hour `(avg exec_time, max rows_examined)` over the trailing window
    async fn hourly_summary(
        &mut self,
        lookback_hours: u32,
    ) -> Result<Vec<HourlyBucket>, DatastoreError>;
}
