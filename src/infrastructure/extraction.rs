//! Layered wishlist item extraction
//!
//! Wishlist pages vary wildly in structure, so extraction runs a fixed
//! chain of strategies from most to least reliable: the embedded app-state
//! JSON blob, then schema.org JSON-LD, then a heuristic DOM scan. The
//! first strategy that yields usable items wins outright; results are
//! never merged across strategies.

pub mod dom_scan;
pub mod json_ld;
pub mod pipeline;
pub mod state_blob;

// Re-export public types
pub use dom_scan::DomScanExtractor;
pub use json_ld::JsonLdExtractor;
pub use pipeline::{ExtractionPipeline, PipelineOptions};
pub use state_blob::StateBlobExtractor;

use scraper::Html;
use thiserror::Error;

use crate::domain::item::RawCandidate;

/// Contextual information available to every strategy
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// URL the page was fetched from; relative links resolve against it
    pub source_url: String,
}

impl ExtractContext {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }
}

/// Extraction failures
///
/// Only raised when a strategy's expected structure is present but cannot
/// be decoded. "Nothing here" is an empty result, not an error.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Embedded state blob is not valid JSON: {reason}")]
    MalformedStateBlob { reason: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// One extraction strategy over a parsed page.
pub trait ExtractStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produce zero or more raw candidates from the page.
    fn extract(&self, html: &Html, context: &ExtractContext) -> ExtractResult<Vec<RawCandidate>>;
}
