//! Planwatch monitor
//!
//! Run with: cargo run
//!
//! Environment variables (a .env file is honored):
//! - DB_HOST, DB_USER, DB_PASSWORD, DB_NAME: monitored database (required)
//! - DB_PORT: database port (default: 3306)
//! - DB_CHARSET: connection character set (default: utf8mb4)
//! - ALERT_WEBHOOK_URL: webhook endpoint for alerts (optional)
//! - PROBE_INTERVAL_SECS: pause between probe ticks (default: 5)
//! - SLOW_QUERY_COST: plan cost ceiling above which probes alert (default: 1000)
//! - LOCK_WARNING, ROWS_WARNING: reserved threshold ceilings
//! - REPORT_DIR: directory for daily SVG reports (default: reports)
//! - RUST_LOG: log level (default: info)

use planwatch::alerts::WebhookSink;
use planwatch::config::Config;
use planwatch::datastore::MySqlStore;
use planwatch::monitor::{workload, MonitoringEngine, SharedThresholds};
use planwatch::report::ReportGenerator;
use planwatch::scheduler::Scheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("planwatch configuration:");
    tracing::info!(
        "  Database: {}@{}:{}/{}",
        config.database.user,
        config.database.host,
        config.database.port,
        config.database.database
    );
    tracing::info!("  Probe interval: {:?}", config.probe_interval);
    tracing::info!(
        "  Slow query cost ceiling: {}",
        config.thresholds.slow_query_cost
    );
    tracing::info!(
        "  Webhook alerts: {}",
        if config.webhook_url.is_some() {
            "configured"
        } else {
            "disabled (log only)"
        }
    );
    tracing::info!("  Report directory: {}", config.report_dir);

    // Startup connectivity failure is fatal; no retry loop here
    let mut store = MySqlStore::connect(&config.database).await?;
    store.ensure_schema().await?;
    tracing::info!("datastore connection established");

    let thresholds = SharedThresholds::new(config.thresholds.clone());
    let sink = WebhookSink::new(config.webhook_url.clone());
    let engine = MonitoringEngine::new(store, sink, thresholds);
    let reporter = ReportGenerator::new(&config.report_dir);

    let scheduler = Scheduler::new(
        engine,
        workload().to_vec(),
        config.probe_interval,
        reporter,
    );

    // Run until interrupted; the in-flight tick completes before we stop
    let engine = scheduler
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    engine.into_store().close().await?;
    tracing::info!("datastore connection closed");

    Ok(())
}
