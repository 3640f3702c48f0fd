//! Probe execution: explain, extract, evaluate, alert, persist

use std::time::Instant;

use crate::alerts::{AlertSink, DeliveryResult};
use crate::datastore::{Datastore, DatastoreError};
use crate::metrics::{HourlyBucket, Measurement, QueryKind};
use crate::plan::{extract_estimate, MalformedPlanError};

use super::thresholds::SharedThresholds;
use super::workload::ProbeSpec;

/// Why a single probe failed. Every variant is isolated to that probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("explain request failed: {0}")]
    Explain(#[source] DatastoreError),

    #[error("malformed explain payload: {0}")]
    Plan(#[from] MalformedPlanError),

    #[error("failed to persist measurement: {0}")]
    Persist(#[source] DatastoreError),
}

/// Runs probes against one datastore connection and routes violations to
/// the alert sink
pub struct MonitoringEngine<D, S> {
    store: D,
    sink: S,
    thresholds: SharedThresholds,
}

impl<D: Datastore, S: AlertSink> MonitoringEngine<D, S> {
    pub fn new(store: D, sink: S, thresholds: SharedThresholds) -> Self {
        Self {
            store,
            sink,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &SharedThresholds {
        &self.thresholds
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Give the datastore back so the caller can release its connection
    pub fn into_store(self) -> D {
        self.store
    }

    /// Run one probe for a statement.
    ///
    /// Obtains the explain plan, extracts its cost figures, alerts when the
    /// cost exceeds the current threshold, then persists one measurement.
    /// The returned seconds cover obtaining the plan, not executing the
    /// statement. On a malformed plan nothing is persisted and no alert is
    /// evaluated.
    pub async fn probe(&mut self, statement: &str, kind: QueryKind) -> Result<f64, ProbeError> {
        let start = Instant::now();

        let payload = self
            .store
            .explain(statement)
            .await
            .map_err(ProbeError::Explain)?;
        let estimate = extract_estimate(&payload)?;
        let exec_time = start.elapsed().as_secs_f64();

        // Alert before logging the measurement; delivery failures are
        // best-effort and never abort the probe.
        if self.thresholds.should_alert(estimate.query_cost) {
            let message = format!(
                "Slow query detected\nquery cost: {}\nquery: {}",
                estimate.query_cost, statement
            );
            if let DeliveryResult::Failed(reason) = self.sink.send(&message).await {
                tracing::warn!(%reason, kind = %kind, "alert delivery failed");
            }
        }

        let measurement = Measurement {
            query_kind: kind,
            exec_time,
            rows_examined: estimate.rows_examined_per_scan,
            lock_time: 0.0,
        };
        self.store
            .append(&measurement)
            .await
            .map_err(ProbeError::Persist)?;

        Ok(exec_time)
    }

    /// Run every workload probe once, sequentially. A failing probe is
    /// logged and does not stop the remaining probes.
    pub async fn run_tick(&mut self, workload: &[ProbeSpec]) {
        for spec in workload {
            match self.probe(spec.statement, spec.kind).await {
                Ok(exec_time) => {
                    tracing::debug!(kind = %spec.kind, exec_time, "probe completed");
                }
                Err(e) => {
                    tracing::error!(kind = %spec.kind, error = %e, "probe failed");
                }
            }
        }
    }

    /// Aggregate read used by the daily report
    pub async fn hourly_summary(
        &mut self,
        lookback_hours: u32,
    ) -> Result<Vec<HourlyBucket>, DatastoreError> {
        self.store.hourly_summary(lookback_hours).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::DeliveryResult;
    use crate::datastore::MemoryStore;
    use crate::monitor::workload::workload;
    use crate::monitor::Thresholds;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const CHEAP_PLAN: &str = r#"{
        "query_block": {
            "cost_info": { "query_cost": "5.0" },
            "table": { "rows_examined_per_scan": 42 }
        }
    }"#;

    /// Sink that records every message it is asked to deliver
    #[derive(Clone, Default)]
    struct CollectingSink {
        messages: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl AlertSink for CollectingSink {
        async fn send(&self, message: &str) -> DeliveryResult {
            self.messages.lock().push(message.to_string());
            if self.fail {
                DeliveryResult::Failed("transport down".to_string())
            } else {
                DeliveryResult::Delivered
            }
        }
    }

    fn engine_with(
        store: MemoryStore,
        sink: CollectingSink,
        slow_query_cost: f64,
    ) -> MonitoringEngine<MemoryStore, CollectingSink> {
        let thresholds = SharedThresholds::new(Thresholds {
            slow_query_cost,
            ..Thresholds::default()
        });
        MonitoringEngine::new(store, sink, thresholds)
    }

    #[tokio::test]
    async fn test_alert_fires_above_threshold() {
        let mut store = MemoryStore::new();
        store.push_plan(CHEAP_PLAN);
        let sink = CollectingSink::default();
        let messages = Arc::clone(&sink.messages);

        let mut engine = engine_with(store, sink, 1.0);
        engine.probe("SELECT 1", QueryKind::Read).await.unwrap();

        let messages = messages.lock();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("5"));
        assert!(messages[0].contains("SELECT 1"));

        let rows = engine.store().rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].measurement.query_kind, QueryKind::Read);
        assert_eq!(rows[0].measurement.rows_examined, 42);
        assert_eq!(rows[0].measurement.lock_time, 0.0);
    }

    #[tokio::test]
    async fn test_no_alert_below_default_threshold() {
        let mut store = MemoryStore::new();
        store.push_plan(CHEAP_PLAN);
        let sink = CollectingSink::default();
        let messages = Arc::clone(&sink.messages);

        // Default ceiling is 1000.0; a 5.0-cost plan stays quiet
        let mut engine =
            MonitoringEngine::new(store, sink, SharedThresholds::default());
        engine.probe("SELECT 1", QueryKind::Read).await.unwrap();

        assert!(messages.lock().is_empty());
        assert_eq!(engine.store().rows().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_block_logging() {
        let mut store = MemoryStore::new();
        store.push_plan(CHEAP_PLAN);
        let sink = CollectingSink {
            fail: true,
            ..CollectingSink::default()
        };
        let messages = Arc::clone(&sink.messages);

        let mut engine = engine_with(store, sink, 1.0);
        let result = engine.probe("SELECT 1", QueryKind::Read).await;

        assert!(result.is_ok());
        assert_eq!(messages.lock().len(), 1);
        assert_eq!(engine.store().rows().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_plan_aborts_probe() {
        let mut store = MemoryStore::new();
        store.push_plan(r#"{"not_a_query_block": {}}"#);
        let sink = CollectingSink::default();
        let messages = Arc::clone(&sink.messages);

        let mut engine = engine_with(store, sink, 1.0);
        let err = engine.probe("SELECT 1", QueryKind::Read).await.unwrap_err();

        assert!(matches!(err, ProbeError::Plan(_)));
        assert!(messages.lock().is_empty());
        assert!(engine.store().rows().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_error_is_surfaced() {
        let mut store = MemoryStore::new();
        store.push_plan(CHEAP_PLAN);
        store.fail_appends(true);

        let mut engine = engine_with(store, CollectingSink::default(), 1000.0);
        let err = engine.probe("SELECT 1", QueryKind::Read).await.unwrap_err();
        assert!(matches!(err, ProbeError::Persist(_)));
    }

    #[tokio::test]
    async fn test_tick_probes_full_workload() {
        let store = MemoryStore::new();
        let mut engine =
            MonitoringEngine::new(store, CollectingSink::default(), SharedThresholds::default());

        engine.run_tick(&workload()).await;

        let kinds: Vec<QueryKind> = engine
            .store()
            .rows()
            .iter()
            .map(|r| r.measurement.query_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![QueryKind::Read, QueryKind::Write, QueryKind::Update]
        );
    }

    #[tokio::test]
    async fn test_failing_probe_does_not_stop_the_tick() {
        let mut store = MemoryStore::new();
        // First probe gets a malformed payload, the rest fall back to the
        // default plan
        store.push_plan("garbage");
        let mut engine =
            MonitoringEngine::new(store, CollectingSink::default(), SharedThresholds::default());

        engine.run_tick(&workload()).await;

        let kinds: Vec<QueryKind> = engine
            .store()
            .rows()
            .iter()
            .map(|r| r.measurement.query_kind)
            .collect();
        assert_eq!(kinds, vec![QueryKind::Write, QueryKind::Update]);
    }

    /// Store and sink sharing one journal, to assert alert/persist ordering
    #[derive(Clone)]
    struct Journal(Arc<Mutex<Vec<&'static str>>>);

    struct JournalStore(Journal);

    #[async_trait]
    impl Datastore for JournalStore {
        async fn explain(&mut self, _statement: &str) -> Result<String, DatastoreError> {
            Ok(CHEAP_PLAN.to_string())
        }

        async fn append(&mut self, _measurement: &Measurement) -> Result<(), DatastoreError> {
            (self.0).0.lock().push("persist");
            Ok(())
        }

        async fn hourly_summary(
            &mut self,
            _lookback_hours: u32,
        ) -> Result<Vec<HourlyBucket>, DatastoreError> {
            Ok(Vec::new())
        }
    }

    struct JournalSink(Journal);

    #[async_trait]
    impl AlertSink for JournalSink {
        async fn send(&self, _message: &str) -> DeliveryResult {
            (self.0).0.lock().push("alert");
            DeliveryResult::Delivered
        }
    }

    #[tokio::test]
    async fn test_alert_precedes_persistence() {
        let journal = Journal(Arc::new(Mutex::new(Vec::new())));
        let thresholds = SharedThresholds::new(Thresholds {
            slow_query_cost: 1.0,
            ..Thresholds::default()
        });
        let mut engine = MonitoringEngine::new(
            JournalStore(journal.clone()),
            JournalSink(journal.clone()),
            thresholds,
        );

        engine.probe("SELECT 1", QueryKind::Read).await.unwrap();

        assert_eq!(*journal.0.lock(), vec!["alert", "persist"]);
    }
}
