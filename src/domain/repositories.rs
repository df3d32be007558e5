//! Repository interfaces for wishlist snapshot state
//!
//! Trait definitions for the persistence seam between the reconciliation
//! engine and the concrete store.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::events::ChangeSet;
use crate::domain::item::ItemRecord;
use crate::domain::reconcile::PriorItem;

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Load the current snapshot of a wishlist, keyed by item id.
    ///
    /// Only items that were present in the most recent cycle count;
    /// tombstoned rows stay out of the snapshot.
    async fn load_snapshot(&self, wishlist_id: &str) -> Result<HashMap<String, PriorItem>>;

    /// Persist the outcome of one reconcile cycle as a single unit.
    ///
    /// Upserts every current item, tombstones removed ones, and appends
    /// the change events. Either all of it lands or none of it does.
    async fn commit_cycle(
        &self,
        wishlist_id: &str,
        items: &[ItemRecord],
        changes: &ChangeSet,
        ts: DateTime<Utc>,
    ) -> Result<()>;
}
