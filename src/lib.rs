//! Planwatch: MySQL query-plan performance monitor
//!
//! Continuously probes a fixed read/write/update workload against one
//! MySQL connection, derives a cost signal from `EXPLAIN FORMAT=JSON`
//! output, alerts over a webhook when the planner cost exceeds a
//! configured ceiling, logs every probe as a measurement row, and writes a
//! daily SVG summary of hourly aggregates.
//!
//! # Features
//!
//! - **Plan-cost probing**: measures optimizer cost and planning latency,
//!   not realized statement runtime
//! - **Threshold alerting**: cost-only predicate over an operator-mutable
//!   threshold cell
//! - **Best-effort webhook delivery**: one attempt, local log first, a
//!   transport outage never stops collection
//! - **Durable measurement log**: one row per completed probe, hourly
//!   aggregates for reporting
//! - **Daily report**: SVG chart of average plan-latency and max rows
//!   examined per hour
//!
//! # Example
//!
//! ```
//! use planwatch::plan::extract_estimate;
//!
//! let payload = r#"{
//!     "query_block": {
//!         "cost_info": { "query_cost": "42.5" },
//!         "table": { "rows_examined_per_scan": 128 }
//!     }
//! }"#;
//!
//! let estimate = extract_estimate(payload).unwrap();
//! assert_eq!(estimate.query_cost, 42.5);
//! assert_eq!(estimate.rows_examined_per_scan, 128);
//! ```

pub mod alerts;
pub mod config;
pub mod datastore;
pub mod metrics;
pub mod monitor;
pub mod plan;
pub mod report;
pub mod scheduler;

// Re-export commonly used types
pub use alerts::{AlertSink, DeliveryResult, WebhookSink};
pub use config::{Config, ConfigError};
pub use datastore::{Datastore, DatastoreError, MySqlStore};
pub use metrics::{HourlyBucket, Measurement, QueryKind};
pub use monitor::{MonitoringEngine, ProbeError, SharedThresholds, Thresholds};
pub use plan::{extract_estimate, MalformedPlanError, PlanEstimate};
pub use report::ReportGenerator;
pub use scheduler::Scheduler;
