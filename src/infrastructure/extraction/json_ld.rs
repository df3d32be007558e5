//! schema.org JSON-LD extraction
//!
//! Second-tier strategy for pages that publish an `ItemList` in
//! `<script type="application/ld+json">` blocks. Blocks are parsed
//! independently and malformed ones are skipped, since pages routinely
//! carry several unrelated JSON-LD payloads of mixed quality.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::{ExtractContext, ExtractResult, ExtractStrategy};
use crate::domain::item::{RawCandidate, RawPrice};

/// Availability values that mean the item cannot currently be bought.
const UNAVAILABLE_MARKERS: &[&str] = &["outofstock", "soldout", "discontinued"];

/// Extracts items from schema.org `ItemList` structured data.
pub struct JsonLdExtractor {
    script_selector: Selector,
}

impl JsonLdExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let script_selector = Selector::parse(r#"script[type="application/ld+json"]"#)
            .map_err(|e| anyhow::anyhow!("Failed to compile JSON-LD selector: {}", e))?;
        Ok(Self { script_selector })
    }
}

impl ExtractStrategy for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json_ld"
    }

    fn extract(&self, html: &Html, _context: &ExtractContext) -> ExtractResult<Vec<RawCandidate>> {
        let mut candidates = Vec::new();

        for script in html.select(&self.script_selector) {
            let raw_json: String = script.text().collect();
            let parsed: Value = match serde_json::from_str(&raw_json) {
                Ok(value) => value,
                Err(e) => {
                    debug!("Skipping malformed JSON-LD block: {}", e);
                    continue;
                }
            };

            // A block may hold a single node or an array of nodes.
            let nodes = match parsed {
                Value::Array(nodes) => nodes,
                node => vec![node],
            };

            for node in &nodes {
                if !is_item_list(node) {
                    continue;
                }
                let Some(elements) = node.get("itemListElement").and_then(Value::as_array) else {
                    continue;
                };
                for element in elements {
                    // ListItem entries wrap the product under "item".
                    let item = match element.get("item") {
                        Some(inner) if inner.is_object() => inner,
                        _ => element,
                    };
                    if let Some(candidate) = candidate_from_item(item) {
                        candidates.push(candidate);
                    }
                }
            }
        }

        Ok(candidates)
    }
}

/// `@type` can be a single string or an array of type names.
fn is_item_list(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "ItemList",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("ItemList")),
        _ => false,
    }
}

fn candidate_from_item(item: &Value) -> Option<RawCandidate> {
    let obj = item.as_object()?;

    let offer = first_offer(obj.get("offers"));
    let (price, currency) = match offer {
        Some(offer) => (offer_price(offer), offer_currency(offer)),
        None => (None, None),
    };

    let available = offer
        .and_then(|o| o.get("availability"))
        .and_then(Value::as_str)
        .map(|availability| {
            let lowered = availability.to_lowercase();
            !UNAVAILABLE_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker))
        });

    Some(RawCandidate {
        source_id: id_string(obj.get("@id")),
        name: trimmed_string(obj.get("name")),
        price,
        currency,
        product_url: trimmed_string(obj.get("url")),
        image_url: image_string(obj.get("image")),
        available,
    })
}

/// `offers` may be a single Offer object or an array of them.
fn first_offer(offers: Option<&Value>) -> Option<&Value> {
    match offers? {
        offer @ Value::Object(_) => Some(offer),
        Value::Array(list) => list.iter().find(|v| v.is_object()),
        _ => None,
    }
}

/// Numeric offer prices are major units; strings keep their raw text so
/// the shared price parser can deal with separators and symbols.
fn offer_price(offer: &Value) -> Option<RawPrice> {
    match offer.get("price")? {
        Value::Number(n) => n.as_f64().map(RawPrice::MajorUnits),
        Value::String(s) => Some(RawPrice::Text(s.clone())),
        _ => None,
    }
}

fn offer_currency(offer: &Value) -> Option<String> {
    trimmed_string(offer.get("priceCurrency"))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn trimmed_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_empty)
}

/// `image` is a URL string or an array of URL strings.
fn image_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(s),
        Value::Array(list) => list.iter().find_map(|v| trimmed_string(Some(v))),
        _ => None,
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_scripts(blocks: &[&str]) -> Html {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        Html::parse_document(&format!("<html><head>{}</head><body></body></html>", scripts))
    }

    fn extract(blocks: &[&str]) -> Vec<RawCandidate> {
        let extractor = JsonLdExtractor::new().unwrap();
        let html = page_with_scripts(blocks);
        extractor
            .extract(&html, &ExtractContext::new("https://example.com/u/a/wishlist"))
            .unwrap()
    }

    #[test]
    fn test_extracts_item_list_with_offers() {
        let block = r#"{
            "@context": "https://schema.org",
            "@type": "ItemList",
            "itemListElement": [
                {
                    "@type": "Product",
                    "@id": "prod-1",
                    "name": "Gaming Mouse",
                    "url": "https://shop.test/mouse",
                    "image": "https://cdn.test/mouse.jpg",
                    "offers": {"price": 49.99, "priceCurrency": "EUR"}
                }
            ]
        }"#;

        let candidates = extract(&[block]);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.source_id.as_deref(), Some("prod-1"));
        assert_eq!(c.name.as_deref(), Some("Gaming Mouse"));
        assert!(matches!(c.price, Some(RawPrice::MajorUnits(v)) if (v - 49.99).abs() < 1e-9));
        assert_eq!(c.currency.as_deref(), Some("EUR"));
        assert_eq!(c.image_url.as_deref(), Some("https://cdn.test/mouse.jpg"));
    }

    #[test]
    fn test_unwraps_list_item_nodes() {
        let block = r#"{
            "@type": "ItemList",
            "itemListElement": [
                {
                    "@type": "ListItem",
                    "position": 1,
                    "item": {"name": "Wrapped Product", "url": "https://shop.test/w"}
                }
            ]
        }"#;

        let candidates = extract(&[block]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_deref(), Some("Wrapped Product"));
    }

    #[test]
    fn test_type_array_and_offer_array() {
        let block = r#"{
            "@type": ["Thing", "ItemList"],
            "itemListElement": [
                {
                    "name": "Keyboard",
                    "offers": [{"price": "120.00", "priceCurrency": "GBP"}, {"price": "999.00"}]
                }
            ]
        }"#;

        let candidates = extract(&[block]);
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0].price, Some(RawPrice::Text(ref s)) if s == "120.00"));
        assert_eq!(candidates[0].currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let good = r#"{"@type": "ItemList", "itemListElement": [{"name": "Survivor"}]}"#;
        let candidates = extract(&["{broken", good]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_deref(), Some("Survivor"));
    }

    #[test]
    fn test_non_item_list_nodes_ignored() {
        let breadcrumb = r#"{"@type": "BreadcrumbList", "itemListElement": [{"name": "Home"}]}"#;
        assert!(extract(&[breadcrumb]).is_empty());
    }

    #[test]
    fn test_out_of_stock_availability() {
        let block = r#"{
            "@type": "ItemList",
            "itemListElement": [
                {"name": "A", "offers": {"price": 5, "availability": "https://schema.org/OutOfStock"}},
                {"name": "B", "offers": {"price": 5, "availability": "https://schema.org/InStock"}},
                {"name": "C", "offers": {"price": 5}}
            ]
        }"#;

        let candidates = extract(&[block]);
        assert_eq!(candidates[0].available, Some(false));
        assert_eq!(candidates[1].available, Some(true));
        assert_eq!(candidates[2].available, None);
    }

    #[test]
    fn test_accumulates_across_multiple_lists() {
        let first = r#"{"@type": "ItemList", "itemListElement": [{"name": "One"}]}"#;
        let second = r#"{"@type": "ItemList", "itemListElement": [{"name": "Two"}]}"#;
        let candidates = extract(&[first, second]);
        assert_eq!(candidates.len(), 2);
    }
}
