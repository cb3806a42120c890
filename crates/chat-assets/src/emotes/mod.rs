//! Third-party emote providers.
//!
//! Each provider wraps one upstream API, caches its raw responses by URL,
//! and converts the provider's payload into the common [`Emote`] record.
//! A provider's own error envelope degrades to an empty list; transport
//! failures and unrecognized payloads propagate.

mod bttv;
mod ffz;
mod seventv;
#[cfg(test)]
mod tests;

pub use bttv::BttvProvider;
pub use ffz::{FfzProvider, FfzUser};
pub use seventv::SevenTvProvider;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::AssetError;
use crate::http::{RawResponse, decode_envelope};

/// Where an emote comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "twitch")]
    Twitch,
    #[serde(rename = "ffz")]
    Ffz,
    #[serde(rename = "bttv")]
    Bttv,
    #[serde(rename = "7tv")]
    SevenTv,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Twitch => "twitch",
            Self::Ffz => "ffz",
            Self::Bttv => "bttv",
            Self::SevenTv => "7tv",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image URLs for three resolution tiers, smallest first.
///
/// At least one tier is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Option<String>; 3]")]
pub struct EmoteUrls([Option<String>; 3]);

impl EmoteUrls {
    /// Returns `None` when every tier is missing.
    pub fn new(urls: [Option<String>; 3]) -> Option<Self> {
        urls.iter().any(Option::is_some).then_some(Self(urls))
    }

    /// URL for tier `0..3`, if present.
    pub fn tier(&self, tier: usize) -> Option<&str> {
        self.0.get(tier)?.as_deref()
    }

    /// The smallest available image.
    pub fn smallest(&self) -> &str {
        self.0.iter().flatten().next().map_or("", String::as_str)
    }

    /// The largest available image.
    pub fn largest(&self) -> &str {
        self.0.iter().rev().flatten().next().map_or("", String::as_str)
    }

    pub fn as_array(&self) -> &[Option<String>; 3] {
        &self.0
    }
}

impl TryFrom<[Option<String>; 3]> for EmoteUrls {
    type Error = &'static str;

    fn try_from(urls: [Option<String>; 3]) -> Result<Self, Self::Error> {
        Self::new(urls).ok_or("emote has no image URL")
    }
}

/// A normalized emote ready for the chat renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emote {
    pub id: String,
    pub code: String,
    pub provider: Provider,
    #[serde(rename = "url")]
    pub urls: EmoteUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_zero_width: bool,
}

/// The channel whose emotes are requested.
///
/// Providers key channels differently: FFZ and BTTV by id, 7TV by login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIdentity {
    pub id: String,
    pub login: String,
}

impl ChannelIdentity {
    pub fn new(id: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            login: login.into(),
        }
    }
}

/// Uniform surface over the emote providers.
pub trait EmoteProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Emotes available in every channel.
    fn load_global(&self) -> impl Future<Output = Result<Vec<Emote>, AssetError>> + Send;

    /// Emotes specific to `channel`.
    fn load_for_channel(
        &self,
        channel: &ChannelIdentity,
    ) -> impl Future<Output = Result<Vec<Emote>, AssetError>> + Send;
}

/// Build an [`Emote`], dropping it when no image URL is usable.
pub(crate) fn build_emote(
    provider: Provider,
    id: String,
    code: String,
    urls: [Option<String>; 3],
) -> Option<Emote> {
    let Some(urls) = EmoteUrls::new(urls) else {
        tracing::debug!(provider = provider.as_str(), id, code, "Skipping emote without images");
        return None;
    };
    Some(Emote {
        id,
        code,
        provider,
        urls,
        width: None,
        height: None,
        is_zero_width: false,
    })
}
