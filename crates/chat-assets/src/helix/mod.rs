//! Helix proxy client.
//!
//! Resolves logins to Twitch user ids and serves badges, cheermotes and
//! chat colors through a caching proxy in front of the Twitch Helix API.

mod chat;
mod models;
mod users;

pub use models::{BadgeSets, Cheermotes, HelixUser};

use std::sync::Arc;

use crate::AssetError;
use crate::cache::{ExpiringCache, Ttl};
use crate::config::ChatAssetsConfig;
use crate::http::{HttpFetch, HttpRequest, RawResponse, fetch_cached};

const SOURCE: &str = "helix-proxy";

/// Client for the Helix proxy. Every response is cached by URL.
#[derive(Clone)]
pub struct HelixProxy {
    pub(super) base: String,
    pub(super) cache: ExpiringCache,
    pub(super) fetcher: Arc<dyn HttpFetch>,
    pub(super) default_ttl: Ttl,
    pub(super) global_ttl: Ttl,
}

impl HelixProxy {
    pub fn new(config: &ChatAssetsConfig, cache: ExpiringCache, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            base: config.helix_base.clone(),
            cache,
            fetcher,
            default_ttl: Ttl::For(config.default_ttl),
            global_ttl: Ttl::For(config.global_ttl),
        }
    }

    pub(super) async fn request(
        &self,
        endpoint: &str,
        ttl: Ttl,
    ) -> Result<Arc<RawResponse>, AssetError> {
        let url = format!("{}/{endpoint}", self.base);
        fetch_cached(&self.cache, &self.fetcher, HttpRequest::get(url), ttl).await
    }
}
