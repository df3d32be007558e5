//! Application layer module
//!
//! Use cases that orchestrate the domain logic: reconciliation of
//! observed items against stored snapshots, and the monitoring loop
//! driving fetch, extraction, reconciliation, and notification.

pub mod monitor;
pub mod reconciler;

pub use monitor::WishlistMonitor;
pub use reconciler::Reconciler;
