//! Candidate normalization
//!
//! Turns raw extraction candidates into canonical `ItemRecord`s with a
//! stable identity. Normalization is deterministic: the same candidate
//! always yields the same record, which is what keeps identities stable
//! across polling cycles.

use std::collections::HashMap;

use crate::domain::item::{ItemRecord, RawCandidate, RawPrice};
use crate::domain::price::{major_units_to_cents, parse_price_text};

const DEFAULT_CURRENCY: &str = "USD";

/// Normalize a single candidate.
///
/// Returns `None` when the candidate cannot become a stored record: no
/// usable name after whitespace cleanup, or no natural key to derive an
/// identity from. Price trouble never drops a candidate; it degrades to
/// the unknown price marker.
pub fn normalize_candidate(candidate: RawCandidate) -> Option<ItemRecord> {
    let name = clean_whitespace(candidate.name.as_deref().unwrap_or(""));
    if name.is_empty() {
        return None;
    }

    let product_url = candidate.product_url.unwrap_or_default().trim().to_string();
    let image_url = candidate.image_url.unwrap_or_default().trim().to_string();

    let item_id = derive_item_id(candidate.source_id.as_deref(), &product_url, &name)?;

    let (price_cents, symbol_currency) = resolve_price(candidate.price.as_ref());
    let currency = candidate
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .or_else(|| symbol_currency.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Some(ItemRecord {
        item_id,
        name,
        price_cents,
        currency,
        product_url,
        image_url,
        available: candidate.available.unwrap_or(true),
    })
}

/// Normalize a batch and collapse duplicate identities.
///
/// When several candidates share an `item_id` within one pass, the last
/// one wins while keeping the position of the first occurrence.
pub fn normalize_all(candidates: impl IntoIterator<Item = RawCandidate>) -> Vec<ItemRecord> {
    let mut records: Vec<ItemRecord> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        let Some(record) = normalize_candidate(candidate) else {
            continue;
        };
        match index_by_id.get(&record.item_id) {
            Some(&i) => records[i] = record,
            None => {
                index_by_id.insert(record.item_id.clone(), records.len());
                records.push(record);
            }
        }
    }

    records
}

/// Identity precedence: explicit source id, then product URL hash, then
/// name + URL hash. All hashing is blake3 over the raw bytes.
fn derive_item_id(source_id: Option<&str>, product_url: &str, name: &str) -> Option<String> {
    if let Some(id) = source_id.map(str::trim).filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }
    if !product_url.is_empty() {
        return Some(content_hash(product_url));
    }
    if !name.is_empty() {
        return Some(content_hash(&format!("{name}{product_url}")));
    }
    None
}

fn content_hash(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

fn resolve_price(price: Option<&RawPrice>) -> (Option<i64>, Option<&'static str>) {
    match price {
        Some(RawPrice::Cents(cents)) if *cents >= 0 => (Some(*cents), None),
        Some(RawPrice::Cents(_)) => (None, None),
        Some(RawPrice::MajorUnits(amount)) if amount.is_finite() && *amount >= 0.0 => {
            (Some(major_units_to_cents(*amount)), None)
        }
        Some(RawPrice::MajorUnits(_)) => (None, None),
        Some(RawPrice::Text(text)) => match parse_price_text(text) {
            Some(parsed) => (Some(parsed.cents), parsed.currency),
            None => (None, None),
        },
        None => (None, None),
    }
}

fn clean_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
