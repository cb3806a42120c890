//! 7TV emotes.

use std::sync::Arc;

use serde::Deserialize;

use super::*;
use crate::cache::{ExpiringCache, Ttl};
use crate::config::ChatAssetsConfig;
use crate::http::{HttpFetch, HttpRequest, fetch_cached};

const ZERO_WIDTH: &str = "ZERO_WIDTH";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct SevenTvApiError {
    error: String,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SevenTvEmote {
    id: String,
    name: String,
    #[serde(default)]
    visibility_simple: Option<Vec<String>>,
    #[serde(default)]
    width: Vec<u32>,
    #[serde(default)]
    height: Vec<u32>,
    /// `[scale, url]` pairs, smallest first.
    #[serde(default)]
    urls: Vec<(String, String)>,
}

/// 7TV adapter. Channels are keyed by Twitch login.
#[derive(Clone)]
pub struct SevenTvProvider {
    base: String,
    cache: ExpiringCache,
    fetcher: Arc<dyn HttpFetch>,
    global_ttl: Ttl,
    channel_ttl: Ttl,
    platform: String,
    version: String,
}

impl SevenTvProvider {
    pub fn new(config: &ChatAssetsConfig, cache: ExpiringCache, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            base: config.seventv_base.clone(),
            cache,
            fetcher,
            global_ttl: Ttl::For(config.global_ttl),
            channel_ttl: Ttl::For(config.default_ttl),
            platform: config.seventv_platform.clone(),
            version: config.seventv_version.clone(),
        }
    }

    async fn request(&self, endpoint: &str, ttl: Ttl) -> Result<Arc<RawResponse>, AssetError> {
        let request = HttpRequest::get(format!("{}/{endpoint}", self.base))
            .header("X-SevenTV-Platform", self.platform.as_str())
            .header("X-SevenTV-Version", self.version.as_str());
        fetch_cached(&self.cache, &self.fetcher, request, ttl).await
    }

    async fn load_list(&self, endpoint: &str, ttl: Ttl) -> Result<Vec<Emote>, AssetError> {
        let raw = self.request(endpoint, ttl).await?;
        let data =
            decode_envelope::<Vec<SevenTvEmote>, SevenTvApiError>(Provider::SevenTv.as_str(), &raw)?;
        Ok(data
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_emote)
            .collect())
    }
}

impl EmoteProvider for SevenTvProvider {
    fn provider(&self) -> Provider {
        Provider::SevenTv
    }

    async fn load_global(&self) -> Result<Vec<Emote>, AssetError> {
        let emotes = self.load_list("emotes/global", self.global_ttl).await?;
        tracing::debug!(count = emotes.len(), "Fetched 7TV global emotes");
        Ok(emotes)
    }

    async fn load_for_channel(&self, channel: &ChannelIdentity) -> Result<Vec<Emote>, AssetError> {
        let endpoint = format!("users/{}/emotes", channel.login);
        let emotes = self.load_list(&endpoint, self.channel_ttl).await?;
        tracing::debug!(
            count = emotes.len(),
            login = %channel.login,
            "Fetched 7TV channel emotes"
        );
        Ok(emotes)
    }
}

pub(super) fn convert_emote(emote: SevenTvEmote) -> Option<Emote> {
    let is_zero_width = emote
        .visibility_simple
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|v| v == ZERO_WIDTH);
    let mut urls = emote.urls.into_iter().map(|(_, url)| url);
    let tiers = [urls.next(), urls.next(), urls.next()];

    let mut out = build_emote(Provider::SevenTv, emote.id, emote.name, tiers)?;
    out.width = emote.width.first().copied();
    out.height = emote.height.first().copied();
    out.is_zero_width = is_zero_width;
    Some(out)
}
