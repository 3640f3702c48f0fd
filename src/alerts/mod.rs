//! Best-effort alert delivery
//!
//! Alerting is a side channel: a notification outage must never stop
//! metric collection, so sinks report a status instead of an error.

pub mod sink;

pub use sink::{AlertSink, DeliveryResult, WebhookSink};
