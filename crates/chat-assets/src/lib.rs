//! Chat asset aggregation for a Twitch chat client.
//!
//! Fetches badges, cheermotes and third-party emotes (FFZ, BTTV, 7TV),
//! normalizes them, and memoizes in-flight and completed lookups in a
//! short-lived in-memory cache.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod emotes;
pub mod helix;
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use aggregate::{BadgeSets, ChatAssets, merge_badge_sets};
pub use cache::{Clock, CullTimer, ExpiringCache, ManualClock, Memo, SystemClock, Ttl};
pub use config::ChatAssetsConfig;
pub use emotes::{
    BttvProvider, ChannelIdentity, Emote, EmoteProvider, EmoteUrls, FfzProvider, FfzUser, Provider,
    SevenTvProvider,
};
pub use helix::{Cheermotes, HelixProxy, HelixUser};
pub use http::{HttpFetch, HttpRequest, RawResponse, ReqwestFetcher};

/// Unified error type for the chat-assets crate.
///
/// Cloneable so a failed memoized lookup can be handed to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    #[error("HTTP request failed: {0}")]
    Http(Arc<reqwest::Error>),

    #[error("JSON parse error: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("upstream API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("unrecognized {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("no Twitch user found for login {0:?}")]
    UserNotFound(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<reqwest::Error> for AssetError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Arc::new(e))
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}

impl AssetError {
    pub(crate) fn decode(provider: &'static str, e: impl std::fmt::Display) -> Self {
        Self::Decode {
            provider,
            message: e.to_string(),
        }
    }
}
