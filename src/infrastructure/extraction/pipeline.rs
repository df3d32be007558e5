//! Strategy chain with fallthrough
//!
//! Strategies run in declaration order and the first one whose output
//! survives normalization wins. A strategy error is logged and treated
//! like an empty result so a single broken layer never takes the whole
//! monitor down. When every layer comes up empty the page can optionally
//! be dumped to disk for offline diagnosis.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Html;
use tracing::{debug, info, warn};

use super::{
    DomScanExtractor, ExtractContext, ExtractStrategy, JsonLdExtractor, StateBlobExtractor,
};
use crate::domain::item::ItemRecord;
use crate::domain::normalize::normalize_all;
use crate::domain::price::format_cents;

/// Dump filenames are derived from URLs and capped at this length.
const DUMP_NAME_MAX_LEN: usize = 150;

/// Behavior toggles for the pipeline, all off by default.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Directory for zero-result page dumps; `None` disables dumping.
    pub dump_dir: Option<PathBuf>,
    /// Log a few extracted items per page at debug level.
    pub log_samples: bool,
}

/// Ordered extraction chain over a fetched page.
pub struct ExtractionPipeline {
    strategies: Vec<Box<dyn ExtractStrategy>>,
    options: PipelineOptions,
}

impl ExtractionPipeline {
    /// Build the standard chain: state blob, then JSON-LD, then DOM scan.
    pub fn new(options: PipelineOptions) -> anyhow::Result<Self> {
        let strategies: Vec<Box<dyn ExtractStrategy>> = vec![
            Box::new(StateBlobExtractor::new()?),
            Box::new(JsonLdExtractor::new()?),
            Box::new(DomScanExtractor::new()?),
        ];
        Ok(Self::with_strategies(strategies, options))
    }

    /// Build a chain with explicit strategies, used by tests.
    pub fn with_strategies(
        strategies: Vec<Box<dyn ExtractStrategy>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            strategies,
            options,
        }
    }

    /// Run the chain over a page and return normalized items.
    ///
    /// Never fails: strategy errors fall through to the next layer and a
    /// page nothing can handle yields an empty list.
    pub fn extract(&self, html_text: &str, context: &ExtractContext) -> Vec<ItemRecord> {
        let html = Html::parse_document(html_text);

        for strategy in &self.strategies {
            match strategy.extract(&html, context) {
                Ok(candidates) => {
                    if candidates.is_empty() {
                        debug!(
                            "Strategy {} found nothing on {}",
                            strategy.name(),
                            context.source_url
                        );
                        continue;
                    }
                    let records = normalize_all(candidates);
                    if records.is_empty() {
                        debug!(
                            "Strategy {} produced only unusable candidates on {}",
                            strategy.name(),
                            context.source_url
                        );
                        continue;
                    }

                    info!(
                        "✅ Extracted {} items via {} from {}",
                        records.len(),
                        strategy.name(),
                        context.source_url
                    );
                    if self.options.log_samples {
                        for record in records.iter().take(3) {
                            debug!(
                                "Sample item: {} [{}] {}",
                                record.name,
                                format_cents(record.price_cents, &record.currency),
                                record.product_url
                            );
                        }
                    }
                    return records;
                }
                Err(e) => {
                    warn!(
                        "⚠️ Strategy {} failed on {}: {}",
                        strategy.name(),
                        context.source_url,
                        e
                    );
                }
            }
        }

        warn!("❌ No strategy extracted items from {}", context.source_url);
        if let Some(dir) = &self.options.dump_dir {
            dump_page(dir, &context.source_url, html_text);
        }
        Vec::new()
    }
}

/// Write the raw page next to a URL-derived filename for offline
/// inspection. Dump failures are logged, never propagated.
fn dump_page(dir: &Path, url: &str, html_text: &str) {
    let path = dir.join(dump_filename(url));
    let result = fs::create_dir_all(dir).and_then(|_| fs::write(&path, html_text));
    match result {
        Ok(()) => info!("💾 Dumped unparsed page to {}", path.display()),
        Err(e) => warn!("Failed to dump page for {}: {}", url, e),
    }
}

/// Collapse every run of characters outside `[A-Za-z0-9._-]` into one
/// underscore and cap the length, then tack on the extension.
fn dump_filename(url: &str) -> String {
    let mut cleaned = String::with_capacity(url.len());
    let mut last_was_filler = false;
    for c in url.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            cleaned.push(c);
            last_was_filler = false;
        } else if !last_was_filler {
            cleaned.push('_');
            last_was_filler = true;
        }
    }
    cleaned.truncate(DUMP_NAME_MAX_LEN);
    format!("{}.html", cleaned)
}
