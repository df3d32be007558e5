//! Embedded app-state extraction
//!
//! Single-page apps ship their server-rendered state as one large JSON
//! document inside `<script id="__NEXT_DATA__">`. The wishlist items live
//! somewhere inside that tree under an `"items"` key, but the surrounding
//! path shifts between frontend releases, so instead of hardcoding a path
//! we walk the whole tree and take the first plausible item array.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::{ExtractContext, ExtractError, ExtractResult, ExtractStrategy};
use crate::domain::item::{RawCandidate, RawPrice};

/// Recursion guard for pathological blobs.
const MAX_WALK_DEPTH: usize = 64;

/// Extracts items from the embedded application state blob.
pub struct StateBlobExtractor {
    script_selector: Selector,
}

impl StateBlobExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let script_selector = Selector::parse("script#__NEXT_DATA__")
            .map_err(|e| anyhow::anyhow!("Failed to compile state blob selector: {}", e))?;
        Ok(Self { script_selector })
    }
}

impl ExtractStrategy for StateBlobExtractor {
    fn name(&self) -> &'static str {
        "state_blob"
    }

    fn extract(&self, html: &Html, _context: &ExtractContext) -> ExtractResult<Vec<RawCandidate>> {
        let Some(script) = html.select(&self.script_selector).next() else {
            return Ok(Vec::new());
        };

        let raw_json: String = script.text().collect();
        if raw_json.trim().is_empty() {
            return Ok(Vec::new());
        }

        // A present but undecodable blob is a real failure: the page shape
        // we rely on has changed and the caller should know.
        let root: Value =
            serde_json::from_str(&raw_json).map_err(|e| ExtractError::MalformedStateBlob {
                reason: e.to_string(),
            })?;

        let Some(items) = find_item_array(&root) else {
            debug!("State blob present but no item array found");
            return Ok(Vec::new());
        };

        Ok(items.iter().filter_map(candidate_from_node).collect())
    }
}

/// Depth-first search for the first `"items"` array whose elements look
/// like products. Children are pushed in reverse so the explicit stack
/// visits keys in document order, matching what a recursive walk would do.
fn find_item_array(root: &Value) -> Option<&Vec<Value>> {
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_WALK_DEPTH {
            continue;
        }

        match node {
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.get("items") {
                    if items.iter().any(looks_like_item) {
                        return Some(items);
                    }
                }
                for (_key, child) in map.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
            Value::Array(values) => {
                for child in values.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
            _ => {}
        }
    }

    None
}

fn looks_like_item(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("name") || obj.contains_key("title"))
}

fn candidate_from_node(node: &Value) -> Option<RawCandidate> {
    let obj = node.as_object()?;

    Some(RawCandidate {
        source_id: id_field(obj, &["id", "uuid"]),
        name: string_field(obj, &["name", "title"]),
        price: price_field(obj),
        currency: string_field(obj, &["currency", "currencyCode"]),
        product_url: string_field(obj, &["url", "productUrl", "url_path"]),
        image_url: string_field(obj, &["image", "imageUrl"]),
        available: availability_field(obj),
    })
}

/// First non-empty string under any of the given keys.
fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Identifiers may arrive as strings or bare numbers.
fn id_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Integer prices are already minor units, floats are major units, and
/// strings go through the text parser downstream. Null values fall
/// through to the next key so `{"price": null, "priceCents": 500}` still
/// resolves.
fn price_field(obj: &serde_json::Map<String, Value>) -> Option<RawPrice> {
    ["price", "price_cents", "priceCents"]
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .and_then(raw_price_from_value)
}

fn raw_price_from_value(value: &Value) -> Option<RawPrice> {
    match value {
        Value::Number(n) => {
            if let Some(cents) = n.as_i64() {
                Some(RawPrice::Cents(cents))
            } else {
                n.as_f64().map(RawPrice::MajorUnits)
            }
        }
        Value::String(s) => Some(RawPrice::Text(s.clone())),
        _ => None,
    }
}

fn availability_field(obj: &serde_json::Map<String, Value>) -> Option<bool> {
    match obj.get("available") {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}
