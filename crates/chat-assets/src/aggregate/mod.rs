//! Aggregated chat assets: badges, cheermotes and emotes for a channel.
//!
//! Each loader resolves the channel's user id, fans out to the providers
//! concurrently, merges the results and caches the merged value under a
//! coarse `<domain>:final:<login>` key. The providers keep their own
//! per-URL cache underneath, so an aggregate miss is often a cheap hit.
//!
//! The join is all-or-nothing: a transport failure in any branch fails
//! the whole aggregate, and the failure stays cached until it expires.

mod badges;
mod cheermotes;
mod emotes;

pub use badges::merge_badge_sets;
pub use crate::helix::BadgeSets;

use std::sync::Arc;

use crate::AssetError;
use crate::cache::{ExpiringCache, Ttl};
use crate::config::ChatAssetsConfig;
use crate::emotes::{BttvProvider, FfzProvider, SevenTvProvider};
use crate::helix::HelixProxy;
use crate::http::{HttpFetch, ReqwestFetcher};

struct ChatAssetsInner {
    cache: ExpiringCache,
    helix: HelixProxy,
    ffz: FfzProvider,
    bttv: BttvProvider,
    seventv: SevenTvProvider,
    default_ttl: Ttl,
    cheermote_ttl: Ttl,
}

/// Entry point for the chat renderer. Cheap to clone.
#[derive(Clone)]
pub struct ChatAssets {
    inner: Arc<ChatAssetsInner>,
}

impl ChatAssets {
    /// Wire every provider to one shared cache and transport.
    pub fn new(config: &ChatAssetsConfig, cache: ExpiringCache, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            inner: Arc::new(ChatAssetsInner {
                helix: HelixProxy::new(config, cache.clone(), fetcher.clone()),
                ffz: FfzProvider::new(config, cache.clone(), fetcher.clone()),
                bttv: BttvProvider::new(config, cache.clone(), fetcher.clone()),
                seventv: SevenTvProvider::new(config, cache.clone(), fetcher),
                cache,
                default_ttl: Ttl::For(config.default_ttl),
                cheermote_ttl: Ttl::For(config.cheermote_ttl),
            }),
        }
    }

    /// Validate `config` and build over a fresh cache and a `reqwest` transport.
    pub fn connect(config: &ChatAssetsConfig) -> Result<Self, AssetError> {
        config.validate()?;
        let fetcher = ReqwestFetcher::new(&config.user_agent)?;
        let cache = ExpiringCache::new(config.default_ttl);
        Ok(Self::new(config, cache, Arc::new(fetcher)))
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.inner.cache
    }

    pub fn helix(&self) -> &HelixProxy {
        &self.inner.helix
    }

    pub fn ffz(&self) -> &FfzProvider {
        &self.inner.ffz
    }

    pub fn bttv(&self) -> &BttvProvider {
        &self.inner.bttv
    }

    pub fn seventv(&self) -> &SevenTvProvider {
        &self.inner.seventv
    }
}
