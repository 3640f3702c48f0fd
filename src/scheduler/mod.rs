//! Fixed-interval probe loop with daily reporting
//!
//! One loop drives all probes sequentially over the engine's single
//! datastore connection. The loop runs until the caller's shutdown future
//! resolves; the in-flight tick completes and no further probes start.

use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::time::{self, MissedTickBehavior};

use crate::alerts::AlertSink;
use crate::datastore::Datastore;
use crate::monitor::{MonitoringEngine, ProbeSpec};
use crate::report::ReportGenerator;

/// Window of measurements the daily report aggregates over
pub const REPORT_LOOKBACK_HOURS: u32 = 24;

/// Default pause between probe ticks
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

pub struct Scheduler<D, S> {
    engine: MonitoringEngine<D, S>,
    workload: Vec<ProbeSpec>,
    interval: Duration,
    reporter: ReportGenerator,
    last_report: NaiveDate,
}

impl<D: Datastore, S: AlertSink> Scheduler<D, S> {
    pub fn new(
        engine: MonitoringEngine<D, S>,
        workload: Vec<ProbeSpec>,
        interval: Duration,
        reporter: ReportGenerator,
    ) -> Self {
        Self {
            engine,
            workload,
            interval,
            reporter,
            last_report: Local::now().date_naive(),
        }
    }

    /// Drive the probe loop until `shutdown` resolves, then hand the engine
    /// back so the caller can release its datastore connection.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> MonitoringEngine<D, S> {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(interval = ?self.interval, "monitoring started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.engine.run_tick(&self.workload).await;
                    self.maybe_report().await;
                }
                _ = &mut shutdown => {
                    tracing::info!("shutdown signal received, stopping monitor");
                    break;
                }
            }
        }

        self.engine
    }

    /// Emit the daily report on the first tick after a local date change.
    /// A failed report leaves the date unchanged so a later tick retries.
    async fn maybe_report(&mut self) {
        let today = Local::now().date_naive();
        if !report_due(self.last_report, today) {
            return;
        }

        match self.engine.hourly_summary(REPORT_LOOKBACK_HOURS).await {
            Ok(buckets) => match self.reporter.write(today, &buckets) {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "daily report written");
                    self.last_report = today;
                }
                Err(e) => tracing::error!(error = %e, "failed to write daily report"),
            },
            Err(e) => tracing::error!(error = %e, "failed to read hourly summary"),
        }
    }
}

/// A report is due when the local calendar date has changed since the last
/// one. Explicit date comparison, not elapsed time: a tick skipped across
/// midnight still triggers exactly one report.
pub fn report_due(last_report: NaiveDate, today: NaiveDate) -> bool {
    today != last_report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_is_not_due() {
        assert!(!report_due(date(2026, 8, 6), date(2026, 8, 6)));
    }

    #[test]
    fn test_next_day_is_due() {
        assert!(report_due(date(2026, 8, 6), date(2026, 8, 7)));
    }

    #[test]
    fn test_skipped_days_are_still_due_once() {
        // Irregular tick timing across several midnights still compares
        // dates, not elapsed time
        assert!(report_due(date(2026, 8, 6), date(2026, 8, 9)));
    }
}
