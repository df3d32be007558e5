//! Snapshot reconciliation use case
//!
//! One reconcile call covers a full observation cycle: load what we knew,
//! diff it against what we just saw, and commit both the new snapshot and
//! the resulting events in a single transaction. Callers get the change
//! set back to decide whether anything is worth announcing.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use crate::domain::events::ChangeSet;
use crate::domain::item::ItemRecord;
use crate::domain::reconcile::diff_snapshots;
use crate::domain::repositories::SnapshotRepository;

/// Reconciles extracted items against the stored snapshot.
pub struct Reconciler {
    repo: Arc<dyn SnapshotRepository>,
}

impl Reconciler {
    pub fn new(repo: Arc<dyn SnapshotRepository>) -> Self {
        Self { repo }
    }

    /// Diff `items` against the previous snapshot of `wishlist_id` and
    /// persist the outcome atomically.
    pub async fn reconcile(&self, wishlist_id: &str, items: &[ItemRecord]) -> Result<ChangeSet> {
        let prior = self.repo.load_snapshot(wishlist_id).await?;
        let changes = diff_snapshots(&prior, items);

        self.repo
            .commit_cycle(wishlist_id, items, &changes, Utc::now())
            .await?;

        if changes.is_empty() {
            debug!("No changes for {} ({} items)", wishlist_id, items.len());
        } else {
            info!(
                "🔄 Changes for {}: {} added, {} price changed, {} removed",
                wishlist_id,
                changes.added.len(),
                changes.price_changed.len(),
                changes.removed.len()
            );
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::reconcile::PriorItem;

    /// In-memory stand-in recording what gets committed.
    #[derive(Default)]
    struct FakeRepo {
        snapshot: Mutex<HashMap<String, PriorItem>>,
        committed: Mutex<Vec<(String, usize, usize)>>,
    }

    #[async_trait]
    impl SnapshotRepository for FakeRepo {
        async fn load_snapshot(&self, _wishlist_id: &str) -> Result<HashMap<String, PriorItem>> {
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn commit_cycle(
            &self,
            wishlist_id: &str,
            items: &[ItemRecord],
            changes: &ChangeSet,
            _ts: DateTime<Utc>,
        ) -> Result<()> {
            self.committed.lock().unwrap().push((
                wishlist_id.to_string(),
                items.len(),
                changes.total(),
            ));
            Ok(())
        }
    }

    fn item(id: &str, cents: i64) -> ItemRecord {
        ItemRecord {
            item_id: id.to_string(),
            name: format!("Item {}", id),
            price_cents: Some(cents),
            currency: "USD".to_string(),
            product_url: String::new(),
            image_url: String::new(),
            available: true,
        }
    }

    #[tokio::test]
    async fn test_first_sight_yields_added_changes() {
        let repo = Arc::new(FakeRepo::default());
        let reconciler = Reconciler::new(repo.clone());

        let items = vec![item("a", 100), item("b", 200)];
        let changes = reconciler.reconcile("ada", &items).await.unwrap();

        assert_eq!(changes.added.len(), 2);
        assert_eq!(changes.removed.len(), 0);

        let committed = repo.committed.lock().unwrap();
        assert_eq!(committed.as_slice(), &[("ada".to_string(), 2, 2)]);
    }

    #[tokio::test]
    async fn test_unchanged_snapshot_still_commits() {
        let repo = Arc::new(FakeRepo::default());
        repo.snapshot.lock().unwrap().insert(
            "a".to_string(),
            PriorItem {
                name: "Item a".to_string(),
                price_cents: Some(100),
            },
        );
        let reconciler = Reconciler::new(repo.clone());

        let changes = reconciler.reconcile("ada", &[item("a", 100)]).await.unwrap();

        // last_seen refreshes even on quiet cycles, so the commit happens.
        assert!(changes.is_empty());
        assert_eq!(repo.committed.lock().unwrap().len(), 1);
    }
}
