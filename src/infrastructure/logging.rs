//! Logging system configuration and initialization
//!
//! Tracing setup with an `EnvFilter`, console output, and an optional
//! non-blocking file writer. The returned worker guard has to stay alive
//! for the life of the process, otherwise buffered file output is lost
//! on shutdown.

use anyhow::{Result, anyhow};
use chrono::Utc;
use tracing::info;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

// Re-export LoggingConfig from config module
pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_NAME: &str = "wishwatch.log";

/// UTC timestamp formatter for log lines
struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the tracing subscriber from configuration.
///
/// `RUST_LOG` overrides the configured level outright, e.g.
/// `RUST_LOG="debug,sqlx::query=debug"` to see queries on a debug run.
/// Without it, verbose dependency targets (sqlx, reqwest/hyper internals,
/// the HTML parser) are suppressed unless trace level is requested.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(config));
    let registry = Registry::default().with(env_filter);

    let mut guard = None;

    match (config.file_output, config.console_output) {
        (true, true) => {
            let (file_writer, file_guard) = file_writer(config)?;
            guard = Some(file_guard);

            // Each branch builds its own console layer: the layer's
            // subscriber parameter has to match the stack it lands on,
            // and the two branches stack different file layers.
            if config.json_format {
                let file_layer = fmt::Layer::new()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(UtcTimeFormatter)
                    .with_target(false)
                    .with_ansi(false);
                // Console stays human-readable even when json_format is on
                let console_layer = fmt::Layer::new()
                    .with_writer(std::io::stdout)
                    .with_timer(UtcTimeFormatter)
                    .with_target(false);
                registry.with(file_layer).with(console_layer).init();
            } else {
                let file_layer = fmt::Layer::new()
                    .with_writer(file_writer)
                    .with_timer(UtcTimeFormatter)
                    .with_target(false)
                    .with_ansi(false);
                let console_layer = fmt::Layer::new()
                    .with_writer(std::io::stdout)
                    .with_timer(UtcTimeFormatter)
                    .with_target(false);
                registry.with(file_layer).with(console_layer).init();
            }
        }
        (true, false) => {
            let (file_writer, file_guard) = file_writer(config)?;
            guard = Some(file_guard);

            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(UtcTimeFormatter)
                .with_target(false)
                .with_ansi(false);

            if config.json_format {
                registry.with(file_layer.json()).init();
            } else {
                registry.with(file_layer).init();
            }
        }
        (false, true) => {
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(UtcTimeFormatter)
                .with_target(false);
            registry.with(console_layer).init();
        }
        (false, false) => {
            return Err(anyhow!("No logging output configured"));
        }
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {}/{}", config.directory, LOG_FILE_NAME);
    }
    if !config.level.to_lowercase().contains("trace") {
        info!("Verbose dependency logs suppressed (use trace level to see all)");
    }

    Ok(guard)
}

fn file_writer(config: &LoggingConfig) -> Result<(non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.directory)
        .map_err(|e| anyhow!("Failed to create log directory {}: {}", config.directory, e))?;
    let appender = rolling::never(&config.directory, LOG_FILE_NAME);
    Ok(non_blocking(appender))
}

/// Base filter with the application level plus noise suppression for
/// chatty dependencies.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::new(&config.level);

    if !config.level.to_lowercase().contains("trace") {
        filter = filter
            .add_directive("sqlx::query=warn".parse().unwrap())
            .add_directive("sqlx::sqlite=warn".parse().unwrap())
            .add_directive("reqwest=info".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("h2=warn".parse().unwrap())
            .add_directive("html5ever=warn".parse().unwrap())
            .add_directive("selectors=warn".parse().unwrap());
    }

    filter
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== wishwatch {} ===", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
}
