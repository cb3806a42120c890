//! FrankerFaceZ emotes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use super::*;
use crate::cache::{ExpiringCache, Ttl};
use crate::config::ChatAssetsConfig;
use crate::http::{HttpFetch, HttpRequest, fetch_cached};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FfzApiError {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct FfzEmote {
    id: u64,
    name: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    urls: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
struct FfzEmoteSet {
    #[serde(default)]
    emoticons: Vec<FfzEmote>,
}

#[derive(Debug, Deserialize)]
struct FfzRoom {
    set: u64,
}

#[derive(Debug, Deserialize)]
struct FfzRoomResponse {
    room: FfzRoom,
    sets: HashMap<String, FfzEmoteSet>,
}

#[derive(Debug, Deserialize)]
struct FfzGlobalResponse {
    default_sets: Vec<u64>,
    sets: HashMap<String, FfzEmoteSet>,
}

/// An FFZ account, looked up by Twitch login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FfzUser {
    #[serde(default)]
    pub twitch_id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub emote_sets: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct FfzUserResponse {
    user: FfzUser,
}

/// FFZ adapter. Channels are keyed by Twitch id.
#[derive(Clone)]
pub struct FfzProvider {
    base: String,
    cache: ExpiringCache,
    fetcher: Arc<dyn HttpFetch>,
    global_ttl: Ttl,
    channel_ttl: Ttl,
}

impl FfzProvider {
    pub fn new(config: &ChatAssetsConfig, cache: ExpiringCache, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            base: config.ffz_base.clone(),
            cache,
            fetcher,
            global_ttl: Ttl::For(config.global_ttl),
            channel_ttl: Ttl::For(config.default_ttl),
        }
    }

    async fn request(&self, endpoint: &str, ttl: Ttl) -> Result<Arc<RawResponse>, AssetError> {
        let url = format!("{}/{endpoint}", self.base);
        fetch_cached(&self.cache, &self.fetcher, HttpRequest::get(url), ttl).await
    }

    /// Look up the FFZ account for a Twitch login. `None` if FFZ has no such user.
    pub async fn get_user_from_login(&self, login: &str) -> Result<Option<FfzUser>, AssetError> {
        let raw = self.request(&format!("_user/{login}"), self.channel_ttl).await?;
        let resp = decode_envelope::<FfzUserResponse, FfzApiError>(Provider::Ffz.as_str(), &raw)?;
        Ok(resp.map(|r| r.user))
    }
}

impl EmoteProvider for FfzProvider {
    fn provider(&self) -> Provider {
        Provider::Ffz
    }

    async fn load_global(&self) -> Result<Vec<Emote>, AssetError> {
        let raw = self.request("set/global", self.global_ttl).await?;
        let Some(data) = decode_envelope::<FfzGlobalResponse, FfzApiError>(Provider::Ffz.as_str(), &raw)?
        else {
            return Ok(Vec::new());
        };

        let emotes: Vec<Emote> = data
            .default_sets
            .iter()
            .filter_map(|set_id| find_set(&data.sets, *set_id))
            .flat_map(|set| set.emoticons.iter().cloned())
            .filter_map(convert_emote)
            .collect();
        tracing::debug!(count = emotes.len(), "Fetched FFZ global emotes");
        Ok(emotes)
    }

    async fn load_for_channel(&self, channel: &ChannelIdentity) -> Result<Vec<Emote>, AssetError> {
        let raw = self
            .request(&format!("room/id/{}", channel.id), self.channel_ttl)
            .await?;
        let Some(data) = decode_envelope::<FfzRoomResponse, FfzApiError>(Provider::Ffz.as_str(), &raw)?
        else {
            return Ok(Vec::new());
        };

        let emotes: Vec<Emote> = find_set(&data.sets, data.room.set)
            .map(|set| set.emoticons.as_slice())
            .unwrap_or_default()
            .iter()
            .cloned()
            .filter_map(convert_emote)
            .collect();
        tracing::debug!(
            count = emotes.len(),
            broadcaster_id = %channel.id,
            "Fetched FFZ channel emotes"
        );
        Ok(emotes)
    }
}

fn find_set(sets: &HashMap<String, FfzEmoteSet>, set_id: u64) -> Option<&FfzEmoteSet> {
    let set = sets.get(&set_id.to_string());
    if set.is_none() {
        tracing::warn!(set_id, "FFZ response references a missing emote set");
    }
    set
}

/// FFZ serves protocol-relative URLs.
fn absolute(url: String) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url
    }
}

pub(super) fn convert_emote(emote: FfzEmote) -> Option<Emote> {
    let FfzEmote {
        id,
        name,
        width,
        height,
        mut urls,
    } = emote;
    let mut tier = |scale: &str| urls.remove(scale).flatten().map(absolute);
    let tiers = [tier("1"), tier("2"), tier("4")];

    let mut emote = build_emote(Provider::Ffz, id.to_string(), name, tiers)?;
    emote.width = width;
    emote.height = height;
    Some(emote)
}
