//! Change events
//!
//! A reconcile cycle classifies the difference between the stored snapshot
//! and a fresh extraction into discrete changes. These types carry that
//! outcome to the event log and to notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemRecord;
use crate::domain::price::format_cents;

/// Kind of change detected for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Removed,
    PriceChanged,
}

impl ChangeKind {
    /// Wire/storage label for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::PriceChanged => "price_changed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "added" => Some(ChangeKind::Added),
            "removed" => Some(ChangeKind::Removed),
            "price_changed" => Some(ChangeKind::PriceChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Item that disappeared from the wishlist since the last snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedItem {
    pub item_id: String,
    pub name: String,
}

/// Known-price-to-known-price movement for an item present in both
/// snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub item: ItemRecord,
    pub from_cents: i64,
    pub to_cents: i64,
}

/// Outcome of one reconcile cycle for a single wishlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: Vec<ItemRecord>,
    pub removed: Vec<RemovedItem>,
    pub price_changed: Vec<PriceChange>,
}

/// One row of the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub ts: DateTime<Utc>,
    pub wishlist_id: String,
    pub kind: ChangeKind,
    pub item_id: String,
    pub name: String,
    pub from_price_cents: Option<i64>,
    pub to_price_cents: Option<i64>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.price_changed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.price_changed.len()
    }

    /// Materialize event-log rows for this change set.
    ///
    /// Added events carry only the new price (which may itself be unknown),
    /// removed events carry no prices, price changes carry both sides.
    pub fn to_events(&self, wishlist_id: &str, ts: DateTime<Utc>) -> Vec<ChangeEvent> {
        let mut events = Vec::with_capacity(self.total());
        for item in &self.added {
            events.push(ChangeEvent {
                ts,
                wishlist_id: wishlist_id.to_string(),
                kind: ChangeKind::Added,
                item_id: item.item_id.clone(),
                name: item.name.clone(),
                from_price_cents: None,
                to_price_cents: item.price_cents,
            });
        }
        for change in &self.price_changed {
            events.push(ChangeEvent {
                ts,
                wishlist_id: wishlist_id.to_string(),
                kind: ChangeKind::PriceChanged,
                item_id: change.item.item_id.clone(),
                name: change.item.name.clone(),
                from_price_cents: Some(change.from_cents),
                to_price_cents: Some(change.to_cents),
            });
        }
        for removed in &self.removed {
            events.push(ChangeEvent {
                ts,
                wishlist_id: wishlist_id.to_string(),
                kind: ChangeKind::Removed,
                item_id: removed.item_id.clone(),
                name: removed.name.clone(),
                from_price_cents: None,
                to_price_cents: None,
            });
        }
        events
    }

    /// Plain-text notification body listing every change.
    pub fn summary(&self, wishlist_id: &str) -> String {
        let mut lines = vec![format!("Wishlist: {}", wishlist_id), String::new()];

        if !self.added.is_empty() {
            lines.push("Added:".to_string());
            for item in &self.added {
                lines.push(format!(
                    "  • {} ({}) {}",
                    item.name,
                    format_cents(item.price_cents, &item.currency),
                    item.product_url
                ));
            }
        }
        if !self.price_changed.is_empty() {
            lines.push("Price changes:".to_string());
            for change in &self.price_changed {
                lines.push(format!(
                    "  • {}: {} -> {} {}",
                    change.item.name,
                    format_cents(Some(change.from_cents), &change.item.currency),
                    format_cents(Some(change.to_cents), &change.item.currency),
                    change.item.product_url
                ));
            }
        }
        if !self.removed.is_empty() {
            lines.push("Removed:".to_string());
            for removed in &self.removed {
                lines.push(format!("  • {}", removed.name));
            }
        }

        lines.join("\n")
    }
}
