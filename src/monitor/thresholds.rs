//! Alert threshold configuration

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Ceilings that decide when a probe alerts.
///
/// Only `slow_query_cost` participates in the alert decision today.
/// `lock_warning` and `rows_warning` are carried as configuration for
/// future lock-wait and row-scan alerting but are not consulted, and
/// `lock_time` is always recorded as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Plan cost above which a probe alerts
    pub slow_query_cost: f64,
    /// Lock time ceiling, seconds (not yet consulted)
    pub lock_warning: f64,
    /// Rows examined ceiling (not yet consulted)
    pub rows_warning: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slow_query_cost: 1000.0,
            lock_warning: 0.1,
            rows_warning: 1000,
        }
    }
}

impl Thresholds {
    /// Cost-only alert predicate. The boundary value does not alert.
    pub fn should_alert(&self, cost: f64) -> bool {
        cost > self.slow_query_cost
    }
}

/// Operator-mutable threshold cell shared with the engine.
///
/// Probes read the latest value at call time; there is no snapshot caching,
/// so tightening thresholds for a diagnostic burst takes effect on the next
/// probe.
#[derive(Debug, Clone, Default)]
pub struct SharedThresholds(Arc<RwLock<Thresholds>>);

impl SharedThresholds {
    pub fn new(thresholds: Thresholds) -> Self {
        Self(Arc::new(RwLock::new(thresholds)))
    }

    pub fn get(&self) -> Thresholds {
        self.0.read().clone()
    }

    pub fn set(&self, thresholds: Thresholds) {
        *self.0.write() = thresholds;
    }

    pub fn should_alert(&self, cost: f64) -> bool {
        self.0.read().should_alert(cost)
    }
}
