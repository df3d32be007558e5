//! Wishlist item types
//!
//! `RawCandidate` is what an extraction strategy emits straight off the
//! page; `ItemRecord` is the canonical, identity-bearing record the
//! reconciliation engine and the store work with.

use serde::{Deserialize, Serialize};

/// Price value as an extraction strategy found it, before normalization.
///
/// Sources disagree on units: embedded state blobs carry integer cents,
/// JSON-LD offers carry major-unit numbers, and page text carries strings.
/// Each strategy picks the variant matching its source's convention.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPrice {
    /// Integer amount already denominated in cents.
    Cents(i64),
    /// Major-unit amount (dollars, euros, ...).
    MajorUnits(f64),
    /// Free-form text such as `"$12.34"` or `"1.234,56"`.
    Text(String),
}

/// Unvalidated item candidate produced by an extraction strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    /// Identifier the source itself exposes (`id`, `uuid`, `@id`).
    pub source_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<RawPrice>,
    pub currency: Option<String>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
    /// Only set when the source explicitly states availability.
    pub available: Option<bool>,
}

/// Canonical wishlist item with a stable derived identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Stable identity: the source id when one exists, otherwise a content
    /// hash of the product URL, otherwise of name + URL.
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub name: String,
    /// Price in cents; `None` means the price is unknown.
    #[serde(rename = "priceCents")]
    pub price_cents: Option<i64>,
    pub currency: String,
    #[serde(rename = "productUrl")]
    pub product_url: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub available: bool,
}

impl ItemRecord {
    /// True when a known price is attached.
    pub fn has_known_price(&self) -> bool {
        self.price_cents.is_some()
    }
}
