//! Target resolution
//!
//! Watch targets arrive either as full wishlist URLs or as bare user
//! handles. The canonical URL resolution produces is also the wishlist
//! identity downstream, so a handle and its full URL join to the same
//! stored wishlist.

/// Resolves configured targets against the wishlist host.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    host: String,
}

impl TargetResolver {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Canonical wishlist URL for a target.
    ///
    /// `http(s)` inputs pass through unchanged; anything else is treated
    /// as a user handle on the configured host.
    pub fn resolve(&self, target: &str) -> String {
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("https://{}/u/{}/wishlist", self.host, target)
        }
    }
}
