//! Infrastructure layer for fetching, extraction, persistence, and delivery
//!
//! Everything here talks to the outside world: the HTTP client that pulls
//! wishlist pages, the extraction strategies that read them, the SQLite
//! store that remembers the previous snapshot, and the webhook notifier.

pub mod config; // Environment and file configuration
pub mod database_connection;
pub mod extraction; // Layered page extraction strategies
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod notifier;
pub mod snapshot_repository;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, RunMode};
pub use database_connection::DatabaseConnection;
pub use extraction::{ExtractContext, ExtractError, ExtractionPipeline, PipelineOptions};
pub use http_client::{FetchError, PageFetcher};
pub use logging::init_logging;
pub use notifier::{Notifier, NotifyError, NotifyOutcome, WebhookNotifier};
pub use snapshot_repository::SqliteSnapshotRepository;
