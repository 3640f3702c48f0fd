//! In-memory datastore double for tests and harnesses

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};

use super::{Datastore, DatastoreError};
use crate::metrics::{HourlyBucket, Measurement};

const DEFAULT_PLAN: &str = r#"{
    "query_block": {
        "cost_info": { "query_cost": "1.0" },
        "table": { "rows_examined_per_scan": 1 }
    }
}"#;

/// A measurement with its persistence timestamp
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub measurement: Measurement,
    pub observed_at: DateTime<Utc>,
}

/// Datastore double: queued explain payloads, recorded appends, and hourly
/// aggregation over everything it holds. The lookback window is the SQL
/// store's concern and is not applied here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    plans: VecDeque<String>,
    fallback_plan: Option<String>,
    rows: Vec<StoredRow>,
    fail_appends: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an explain payload; payloads are consumed in FIFO order
    pub fn push_plan(&mut self, payload: impl Into<String>) {
        self.plans.push_back(payload.into());
    }

    /// Payload returned once the queue runs dry (defaults to a cheap plan)
    pub fn set_fallback_plan(&mut self, payload: impl Into<String>) {
        self.fallback_plan = Some(payload.into());
    }

    /// Make every append fail, for persistence-error paths
    pub fn fail_appends(&mut self, fail: bool) {
        self.fail_appends = fail;
    }

    /// Seed an already-persisted row at a fixed timestamp
    pub fn push_row_at(&mut self, measurement: Measurement, observed_at: DateTime<Utc>) {
        self.rows.push(StoredRow {
            measurement,
            observed_at,
        });
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn explain(&mut self, _statement: &str) -> Result<String, DatastoreError> {
        Ok(self
            .plans
            .pop_front()
            .or_else(|| self.fallback_plan.clone())
            .unwrap_or_else(|| DEFAULT_PLAN.to_string()))
    }

    async fn append(&mut self, measurement: &Measurement) -> Result<(), DatastoreError> {
        if self.fail_appends {
            return Err(DatastoreError::Decode("append disabled".to_string()));
        }
        self.rows.push(StoredRow {
            measurement: measurement.clone(),
            observed_at: Utc::now(),
        });
        Ok(())
    }

    async fn hourly_summary(
        &mut self,
        _lookback_hours: u32,
    ) -> Result<Vec<HourlyBucket>, DatastoreError> {
        // (sum, count, max_rows) per hour of day
        let mut buckets: BTreeMap<u32, (f64, u64, u64)> = BTreeMap::new();
        for row in &self.rows {
            let entry = buckets
                .entry(row.observed_at.hour())
                .or_insert((0.0, 0, 0));
            entry.0 += row.measurement.exec_time;
            entry.1 += 1;
            entry.2 = entry.2.max(row.measurement.rows_examined);
        }

        Ok(buckets
            .into_iter()
            .map(|(hour, (sum, count, max_rows))| HourlyBucket {
                hour,
                avg_exec_time: sum / count as f64,
                max_rows_examined: max_rows,
            })
            .collect())
    }
}
