//! wishwatch - Headless wishlist monitoring daemon
//!
//! Periodically fetches public wishlist pages, extracts items through a
//! layered strategy chain (embedded state blob, JSON-LD, heuristic DOM
//! scan), reconciles them against the previous snapshot in SQLite, and
//! announces added, removed, and price-changed items.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the high-level API
pub use application::{Reconciler, WishlistMonitor};
pub use domain::{ChangeEvent, ChangeKind, ChangeSet, ItemRecord, TargetResolver};
pub use infrastructure::{AppConfig, DatabaseConnection, ExtractionPipeline, PageFetcher, RunMode};
