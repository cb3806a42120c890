//! BetterTTV emotes.

use std::sync::Arc;

use serde::Deserialize;

use super::*;
use crate::cache::{ExpiringCache, Ttl};
use crate::config::ChatAssetsConfig;
use crate::http::{HttpFetch, HttpRequest, fetch_cached};

const BTTV_CDN: &str = "https://cdn.betterttv.net/emote";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BttvApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BttvEmote {
    id: String,
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BttvChannelResponse {
    #[serde(default)]
    channel_emotes: Vec<BttvEmote>,
    #[serde(default)]
    shared_emotes: Vec<BttvEmote>,
}

/// BTTV adapter. Channels are keyed by Twitch id.
#[derive(Clone)]
pub struct BttvProvider {
    base: String,
    cache: ExpiringCache,
    fetcher: Arc<dyn HttpFetch>,
    ttl: Ttl,
}

impl BttvProvider {
    /// BTTV's `cached` API is already edge-cached, so global and channel
    /// data share the default TTL.
    pub fn new(config: &ChatAssetsConfig, cache: ExpiringCache, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            base: config.bttv_base.clone(),
            cache,
            fetcher,
            ttl: Ttl::For(config.default_ttl),
        }
    }

    async fn request(&self, endpoint: &str) -> Result<Arc<RawResponse>, AssetError> {
        let url = format!("{}/{endpoint}", self.base);
        fetch_cached(&self.cache, &self.fetcher, HttpRequest::get(url), self.ttl).await
    }
}

impl EmoteProvider for BttvProvider {
    fn provider(&self) -> Provider {
        Provider::Bttv
    }

    async fn load_global(&self) -> Result<Vec<Emote>, AssetError> {
        let raw = self.request("emotes/global").await?;
        let Some(data) = decode_envelope::<Vec<BttvEmote>, BttvApiError>(Provider::Bttv.as_str(), &raw)?
        else {
            return Ok(Vec::new());
        };
        let emotes: Vec<Emote> = data.into_iter().filter_map(convert_emote).collect();
        tracing::debug!(count = emotes.len(), "Fetched BTTV global emotes");
        Ok(emotes)
    }

    async fn load_for_channel(&self, channel: &ChannelIdentity) -> Result<Vec<Emote>, AssetError> {
        let raw = self.request(&format!("users/twitch/{}", channel.id)).await?;
        let Some(data) =
            decode_envelope::<BttvChannelResponse, BttvApiError>(Provider::Bttv.as_str(), &raw)?
        else {
            return Ok(Vec::new());
        };
        let emotes: Vec<Emote> = data
            .channel_emotes
            .into_iter()
            .chain(data.shared_emotes)
            .filter_map(convert_emote)
            .collect();
        tracing::debug!(
            count = emotes.len(),
            broadcaster_id = %channel.id,
            "Fetched BTTV channel emotes"
        );
        Ok(emotes)
    }
}

pub(super) fn convert_emote(emote: BttvEmote) -> Option<Emote> {
    let tiers = ["1x", "2x", "3x"].map(|scale| Some(format!("{BTTV_CDN}/{}/{scale}", emote.id)));
    build_emote(Provider::Bttv, emote.id, emote.code, tiers)
}
