//! External release catalog.
//!
//! This module provides a `CatalogClient` trait for searching a torrent
//! tracker's release catalog and fetching .torrent files, a Gazelle JSON API
//! implementation, and the policy that picks one release per missing track.

mod gazelle;
mod rate_limiter;
mod selection;
mod types;

pub use gazelle::GazelleClient;
pub use rate_limiter::{RateLimiter, TokenBucket};
pub use selection::{group_matches, select_candidate, QualityPreference, VariantRanker};
pub use types::*;

/// Source of the catalog API key.
///
/// Called at most once per client, when the key is first needed. Returning
/// `None` cancels authentication.
pub trait ApiKeySource: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// A key known up front (configuration or environment).
#[derive(Debug, Clone)]
pub struct StaticApiKey(Option<String>);

impl StaticApiKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key)
    }
}

impl ApiKeySource for StaticApiKey {
    fn api_key(&self) -> Option<String> {
        self.0.clone()
    }
}
