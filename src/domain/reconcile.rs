//! Snapshot diffing
//!
//! Pure three-way classification between the stored snapshot of a wishlist
//! and a freshly extracted item list. Persistence happens elsewhere; this
//! module only decides what changed.

use std::collections::{HashMap, HashSet};

use crate::domain::events::{ChangeSet, PriceChange, RemovedItem};
use crate::domain::item::ItemRecord;

/// Prior state of one item, as loaded from the snapshot store.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorItem {
    pub name: String,
    pub price_cents: Option<i64>,
}

/// Classify the difference between the prior snapshot and the current
/// extraction.
///
/// An item missing from the prior snapshot is added; an item present in
/// both with two known, differing prices is a price change; a prior item
/// absent from the current list is removed. Transitions to or from an
/// unknown price are never price changes.
pub fn diff_snapshots(prior: &HashMap<String, PriorItem>, current: &[ItemRecord]) -> ChangeSet {
    let mut changes = ChangeSet::default();
    let current_ids: HashSet<&str> = current.iter().map(|item| item.item_id.as_str()).collect();

    for item in current {
        match prior.get(&item.item_id) {
            None => changes.added.push(item.clone()),
            Some(previous) => {
                if let (Some(from), Some(to)) = (previous.price_cents, item.price_cents) {
                    if from != to {
                        changes.price_changed.push(PriceChange {
                            item: item.clone(),
                            from_cents: from,
                            to_cents: to,
                        });
                    }
                }
            }
        }
    }

    let mut removed: Vec<RemovedItem> = prior
        .iter()
        .filter(|(id, _)| !current_ids.contains(id.as_str()))
        .map(|(id, prev)| RemovedItem {
            item_id: id.clone(),
            name: prev.name.clone(),
        })
        .collect();
    removed.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    changes.removed = removed;

    changes
}
