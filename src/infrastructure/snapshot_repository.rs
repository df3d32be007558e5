//! SQLite-backed wishlist snapshot store
//!
//! Persists the per-wishlist item snapshot and the append-only event log.
//! A reconcile cycle commits as one transaction: item upserts, tombstones
//! for removed items, and event rows all land together or not at all.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::events::{ChangeEvent, ChangeKind, ChangeSet};
use crate::domain::item::ItemRecord;
use crate::domain::reconcile::PriorItem;
use crate::domain::repositories::SnapshotRepository;

/// Full stored row for one item, including bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub item: ItemRecord,
    /// False once the item has been classified as removed.
    pub present: bool,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqliteSnapshotRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteSnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Fetch one stored row, tombstoned or not.
    pub async fn get_item(&self, wishlist_id: &str, item_id: &str) -> Result<Option<StoredItem>> {
        let row = sqlx::query(
            r#"
            SELECT item_id, name, price_cents, currency, product_url, image_url,
                   available, present, first_seen, last_seen
            FROM items
            WHERE wishlist_id = ? AND item_id = ?
            "#,
        )
        .bind(wishlist_id)
        .bind(item_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|row| StoredItem {
            item: ItemRecord {
                item_id: row.get("item_id"),
                name: row.get("name"),
                price_cents: row.get("price_cents"),
                currency: row.get("currency"),
                product_url: row.get("product_url"),
                image_url: row.get("image_url"),
                available: row.get("available"),
            },
            present: row.get("present"),
            first_seen: row.get("first_seen"),
            last_seen: row.get("last_seen"),
        }))
    }

    /// Event log for a wishlist in append order.
    pub async fn events_for_wishlist(&self, wishlist_id: &str) -> Result<Vec<ChangeEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT ts, wishlist_id, kind, item_id, name, from_price_cents, to_price_cents
            FROM events
            WHERE wishlist_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(wishlist_id)
        .fetch_all(&*self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let label: String = row.get("kind");
                let kind = ChangeKind::from_label(&label)
                    .ok_or_else(|| anyhow!("Unknown event kind in store: {label}"))?;
                Ok(ChangeEvent {
                    ts: row.get("ts"),
                    wishlist_id: row.get("wishlist_id"),
                    kind,
                    item_id: row.get("item_id"),
                    name: row.get("name"),
                    from_price_cents: row.get("from_price_cents"),
                    to_price_cents: row.get("to_price_cents"),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    async fn load_snapshot(&self, wishlist_id: &str) -> Result<HashMap<String, PriorItem>> {
        let rows = sqlx::query(
            r#"
            SELECT item_id, name, price_cents
            FROM items
            WHERE wishlist_id = ? AND present = 1
            "#,
        )
        .bind(wishlist_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get("item_id"),
                    PriorItem {
                        name: row.get("name"),
                        price_cents: row.get("price_cents"),
                    },
                )
            })
            .collect())
    }

    async fn commit_cycle(
        &self,
        wishlist_id: &str,
        items: &[ItemRecord],
        changes: &ChangeSet,
        ts: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            // first_seen is only written on insert; upserts refresh the rest
            sqlx::query(
                r#"
                INSERT INTO items
                (wishlist_id, item_id, name, price_cents, currency, product_url,
                 image_url, available, present, first_seen, last_seen)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
                ON CONFLICT(wishlist_id, item_id) DO UPDATE SET
                    name = excluded.name,
                    price_cents = excluded.price_cents,
                    currency = excluded.currency,
                    product_url = excluded.product_url,
                    image_url = excluded.image_url,
                    available = excluded.available,
                    present = 1,
                    last_seen = excluded.last_seen
                "#,
            )
            .bind(wishlist_id)
            .bind(&item.item_id)
            .bind(&item.name)
            .bind(item.price_cents)
            .bind(&item.currency)
            .bind(&item.product_url)
            .bind(&item.image_url)
            .bind(item.available)
            .bind(ts)
            .bind(ts)
            .execute(&mut *tx)
            .await?;
        }

        for removed in &changes.removed {
            sqlx::query("UPDATE items SET present = 0 WHERE wishlist_id = ? AND item_id = ?")
                .bind(wishlist_id)
                .bind(&removed.item_id)
                .execute(&mut *tx)
                .await?;
        }

        for event in changes.to_events(wishlist_id, ts) {
            sqlx::query(
                r#"
                INSERT INTO events
                (ts, wishlist_id, kind, item_id, name, from_price_cents, to_price_cents)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(event.ts)
            .bind(&event.wishlist_id)
            .bind(event.kind.as_str())
            .bind(&event.item_id)
            .bind(&event.name)
            .bind(event.from_price_cents)
            .bind(event.to_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            "💾 Committed cycle for {}: {} items, {} changes",
            wishlist_id,
            items.len(),
            changes.total()
        );
        Ok(())
    }
}
