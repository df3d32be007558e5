//! Wishlist monitoring orchestration
//!
//! Ties the collaborators together into observation cycles: resolve each
//! configured target to a URL, fetch the page, run the extraction chain,
//! reconcile against the stored snapshot, and announce changes. One
//! failing target never blocks the others, and notification failures are
//! logged rather than treated as cycle failures.

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::domain::events::ChangeSet;
use crate::domain::target::TargetResolver;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::extraction::{ExtractContext, ExtractionPipeline};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::notifier::{Notifier, NotifyOutcome};

use super::reconciler::Reconciler;

/// Drives monitoring cycles over all configured targets.
pub struct WishlistMonitor {
    config: AppConfig,
    resolver: TargetResolver,
    fetcher: PageFetcher,
    pipeline: ExtractionPipeline,
    reconciler: Reconciler,
    notifier: Box<dyn Notifier>,
}

impl WishlistMonitor {
    pub fn new(
        config: AppConfig,
        fetcher: PageFetcher,
        pipeline: ExtractionPipeline,
        reconciler: Reconciler,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let resolver = TargetResolver::new(config.wishlist_host.clone());
        Self {
            config,
            resolver,
            fetcher,
            pipeline,
            reconciler,
            notifier,
        }
    }

    /// Run one full observation cycle for a single target.
    ///
    /// The resolved URL doubles as the stored wishlist identity, so a
    /// bare handle and the full URL of the same page join to one wishlist.
    pub async fn process_target(&self, target: &str) -> Result<ChangeSet> {
        let url = self.resolver.resolve(target);
        info!("🌐 Checking {} ({})", target, url);

        let html = self.fetcher.fetch_text(&url).await?;
        let items = self
            .pipeline
            .extract(&html, &ExtractContext::new(url.clone()));
        let changes = self.reconciler.reconcile(&url, &items).await?;

        if !changes.is_empty() {
            self.announce(&url, &changes).await;
        }

        Ok(changes)
    }

    async fn announce(&self, wishlist_id: &str, changes: &ChangeSet) {
        let subject = format!("[wishwatch] Changes detected for {}", wishlist_id);
        let body = changes.summary(wishlist_id);

        match self.notifier.notify(&subject, &body).await {
            Ok(NotifyOutcome::Sent) => {}
            Ok(NotifyOutcome::Skipped) => debug!("Notification skipped for {}", wishlist_id),
            Err(e) => error!("Failed to deliver notification for {}: {}", wishlist_id, e),
        }
    }

    /// Process every configured target once, isolating failures.
    pub async fn run_once(&self) -> Result<()> {
        let targets = self.config.target_list();
        info!("Starting cycle over {} target(s)", targets.len());

        for target in &targets {
            if let Err(e) = self.process_target(target).await {
                error!("❌ Target {} failed: {}", target, e);
            }
        }

        Ok(())
    }

    /// Loop forever with a jittered poll interval until Ctrl+C.
    pub async fn run_daemon(&self) -> Result<()> {
        info!(
            "🚀 Monitoring every {} minutes, press Ctrl+C to stop",
            self.config.poll_minutes
        );

        loop {
            self.run_once().await?;

            let delay = jittered_interval(self.config.poll_minutes);
            debug!("Next cycle in {}s", delay.as_secs());

            tokio::select! {
                _ = sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping monitor");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Poll interval with ±10% jitter so restarts don't sync up into
/// thundering-herd fetch patterns.
fn jittered_interval(poll_minutes: u64) -> Duration {
    let base_secs = poll_minutes.saturating_mul(60);
    let jitter = base_secs / 10;
    let low = base_secs.saturating_sub(jitter);
    let high = base_secs.saturating_add(jitter);
    Duration::from_secs(fastrand::u64(low..=high))
}
