//! Heuristic DOM extraction
//!
//! Last-resort strategy for pages where neither embedded state nor
//! JSON-LD is usable. Product anchors are identified by elimination
//! (long enough text, not a navigation phrase) and the price is searched
//! in the anchor's own text and a few enclosing containers. Anchors with
//! no nearby price are discarded rather than stored with an unknown
//! price, because at this fidelity level a missing price usually means
//! the anchor was never a product at all.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{ExtractContext, ExtractResult, ExtractStrategy};
use crate::domain::item::{RawCandidate, RawPrice};
use crate::domain::price::{ParsedPrice, currency_for_symbol, parse_price_text};

/// Anchor texts that are site chrome, not products.
const NAV_PHRASES: &[&str] = &[
    "login",
    "sign up",
    "about",
    "contact",
    "faq",
    "feature requests",
    "how it works",
    "follow",
    "wishlist",
    "gifters",
];

/// Nodes inspected for a price: the anchor itself plus three ancestors.
const PRICE_SEARCH_LEVELS: usize = 4;

/// Extracts items by scanning anchors and nearby price text.
pub struct DomScanExtractor {
    anchor_selector: Selector,
    image_selector: Selector,
    price_pattern: Regex,
}

impl DomScanExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let anchor_selector = Selector::parse("a[href]")
            .map_err(|e| anyhow::anyhow!("Failed to compile anchor selector: {}", e))?;
        let image_selector = Selector::parse("img[src]")
            .map_err(|e| anyhow::anyhow!("Failed to compile image selector: {}", e))?;
        // Currency symbol not preceded by a word character, then an amount
        // with an optional two-digit decimal tail.
        let price_pattern = Regex::new(r"(?:^|\W)([$€£])\s?([0-9]+(?:[.,][0-9]{2})?)")
            .map_err(|e| anyhow::anyhow!("Failed to compile price pattern: {}", e))?;

        Ok(Self {
            anchor_selector,
            image_selector,
            price_pattern,
        })
    }

    fn price_in_text(&self, text: &str) -> Option<ParsedPrice> {
        let caps = self.price_pattern.captures(text)?;
        let symbol = caps.get(1)?.as_str().chars().next()?;
        let amount = caps.get(2)?.as_str();
        let parsed = parse_price_text(amount)?;

        Some(ParsedPrice {
            cents: parsed.cents,
            currency: currency_for_symbol(symbol),
        })
    }
}

impl ExtractStrategy for DomScanExtractor {
    fn name(&self) -> &'static str {
        "dom_scan"
    }

    fn extract(&self, html: &Html, context: &ExtractContext) -> ExtractResult<Vec<RawCandidate>> {
        let mut candidates = Vec::new();

        for anchor in html.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let name = element_text(&anchor);
            if name.chars().count() < 3 {
                continue;
            }
            let lowered = name.to_lowercase();
            if NAV_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
                continue;
            }

            // Climb from the anchor looking for a price in the enclosing
            // card. The first node that carries one is the card boundary.
            let mut found: Option<(ElementRef, ParsedPrice)> = None;
            let mut current = Some(anchor);
            for _ in 0..PRICE_SEARCH_LEVELS {
                let Some(element) = current else { break };
                if let Some(parsed) = self.price_in_text(&element_text(&element)) {
                    found = Some((element, parsed));
                    break;
                }
                current = element.parent().and_then(ElementRef::wrap);
            }
            let Some((container, parsed)) = found else {
                continue;
            };

            let image_url = container
                .select(&self.image_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| resolve_href(src, &context.source_url));

            candidates.push(RawCandidate {
                source_id: None,
                name: Some(name),
                price: Some(RawPrice::Cents(parsed.cents)),
                currency: parsed.currency.map(str::to_string),
                product_url: Some(resolve_href(href, &context.source_url)),
                image_url,
                available: None,
            });
        }

        Ok(candidates)
    }
}

/// Concatenated descendant text with whitespace collapsed to single
/// spaces, so prices split across inline elements still match.
fn element_text(element: &ElementRef) -> String {
    let parts: Vec<&str> = element.text().flat_map(str::split_whitespace).collect();
    parts.join(" ")
}

fn resolve_href(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html_text: &str) -> Vec<RawCandidate> {
        let extractor = DomScanExtractor::new().unwrap();
        let html = Html::parse_document(html_text);
        extractor
            .extract(&html, &ExtractContext::new("https://throne.com/u/ada/wishlist"))
            .unwrap()
    }

    #[test]
    fn test_extracts_card_with_price_and_image() {
        let html = r#"<html><body>
            <div class="card">
                <a href="/item/blanket">Cozy Blanket</a>
                <span class="price">$12.34</span>
                <img src="/img/blanket.jpg">
            </div>
        </body></html>"#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.name.as_deref(), Some("Cozy Blanket"));
        assert!(matches!(c.price, Some(RawPrice::Cents(1234))));
        assert_eq!(c.currency.as_deref(), Some("USD"));
        assert_eq!(c.product_url.as_deref(), Some("https://throne.com/item/blanket"));
        assert_eq!(
            c.image_url.as_deref(),
            Some("https://throne.com/img/blanket.jpg")
        );
    }

    #[test]
    fn test_navigation_anchors_are_skipped() {
        let html = r#"<html><body>
            <div><a href="/login">Login</a> $5.00</div>
            <div><a href="/how">How It Works</a> $5.00</div>
            <div><a href="/x">Go</a> $5.00</div>
        </body></html>"#;

        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_anchor_without_nearby_price_is_discarded() {
        let html = r#"<html><body>
            <div><a href="/item/1">Mystery Item</a></div>
        </body></html>"#;

        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_price_beyond_search_depth_is_not_found() {
        let html = r#"<html><body>
            <div>$9.99
                <div><div><div>
                    <div><a href="/item/deep">Deep Item</a></div>
                </div></div></div>
            </div>
        </body></html>"#;

        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_currency_symbols_map_to_codes() {
        let html = r#"<html><body>
            <div><a href="/a">Euro Thing</a> €5</div>
            <div><a href="/b">Pound Thing</a> £7.50</div>
        </body></html>"#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].currency.as_deref(), Some("EUR"));
        assert!(matches!(candidates[0].price, Some(RawPrice::Cents(500))));
        assert_eq!(candidates[1].currency.as_deref(), Some("GBP"));
        assert!(matches!(candidates[1].price, Some(RawPrice::Cents(750))));
    }

    #[test]
    fn test_symbol_glued_to_word_is_not_a_price() {
        let html = r#"<html><body>
            <div><a href="/a">Imported Gadget</a> SKU-US$5.00</div>
        </body></html>"#;

        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_price_split_across_inline_elements() {
        let html = r#"<html><body>
            <div><a href="/a">Split Price Thing</a><span>$</span><span>4.20</span></div>
        </body></html>"#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0].price, Some(RawPrice::Cents(420))));
    }

    #[test]
    fn test_relative_href_resolves_against_page_url() {
        let html = r#"<html><body>
            <div><a href="item/2">Relative Thing</a> $3.00</div>
        </body></html>"#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        let url = candidates[0].product_url.as_deref().unwrap();
        assert!(url.starts_with("https://throne.com/"), "got {url}");
        assert!(url.ends_with("item/2"));
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let html = r#"<html><body>
            <div><a href="https://shop.example/item/9">External Thing</a> $8.00</div>
        </body></html>"#;

        let candidates = extract(html);
        assert_eq!(
            candidates[0].product_url.as_deref(),
            Some("https://shop.example/item/9")
        );
    }
}
