//! wishwatch daemon entry point

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use wishwatch::application::{Reconciler, WishlistMonitor};
use wishwatch::infrastructure::config::{AppConfig, RunMode};
use wishwatch::infrastructure::database_connection::DatabaseConnection;
use wishwatch::infrastructure::extraction::{ExtractionPipeline, PipelineOptions};
use wishwatch::infrastructure::http_client::PageFetcher;
use wishwatch::infrastructure::logging::{init_logging, log_system_info};
use wishwatch::infrastructure::notifier::WebhookNotifier;
use wishwatch::infrastructure::snapshot_repository::SqliteSnapshotRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must outlive the runtime so buffered log lines get flushed.
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    let targets = config.target_list();
    if targets.is_empty() {
        anyhow::bail!("No targets configured; set WISHWATCH_TARGETS to a comma-separated list");
    }
    info!("Monitoring {} target(s): {}", targets.len(), targets.join(", "));

    let connection = DatabaseConnection::new(&format!("sqlite:{}", config.state_db))
        .await
        .context("Failed to open state database")?;
    connection
        .migrate()
        .await
        .context("Failed to prepare state database schema")?;

    let fetcher = PageFetcher::new(&config.fetch).context("Failed to build HTTP client")?;
    let pipeline = ExtractionPipeline::new(PipelineOptions {
        dump_dir: config.debug.dump_html.then(|| config.debug_dump_dir()),
        log_samples: config.debug.log_samples,
    })?;
    let repository = Arc::new(SqliteSnapshotRepository::new(connection.pool().clone()));
    let reconciler = Reconciler::new(repository);
    let notifier = Box::new(WebhookNotifier::new(&config.notify)?);

    let mode = config.mode;
    let monitor = WishlistMonitor::new(config, fetcher, pipeline, reconciler, notifier);

    match mode {
        RunMode::Once => monitor.run_once().await,
        RunMode::Daemon => monitor.run_daemon().await,
    }
}
