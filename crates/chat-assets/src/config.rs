//! Runtime configuration with environment overrides.

use std::time::Duration;

use url::Url;

use crate::AssetError;

pub const HELIX_PROXY_BASE: &str = "https://helix-proxy.alca.tv";
pub const FFZ_BASE: &str = "https://api.frankerfacez.com/v1";
pub const BTTV_BASE: &str = "https://api.betterttv.net/3/cached";
pub const SEVENTV_BASE: &str = "https://api.7tv.app/v2";

/// Endpoints, TTLs and headers used by the loaders.
#[derive(Debug, Clone)]
pub struct ChatAssetsConfig {
    pub helix_base: String,
    pub ffz_base: String,
    pub bttv_base: String,
    pub seventv_base: String,
    /// Per-channel endpoints and aggregated badge/emote results.
    pub default_ttl: Duration,
    /// Global emote sets and global badges.
    pub global_ttl: Duration,
    pub cheermote_ttl: Duration,
    pub cull_interval: Duration,
    pub seventv_platform: String,
    pub seventv_version: String,
    pub user_agent: String,
}

impl Default for ChatAssetsConfig {
    fn default() -> Self {
        Self {
            helix_base: HELIX_PROXY_BASE.into(),
            ffz_base: FFZ_BASE.into(),
            bttv_base: BTTV_BASE.into(),
            seventv_base: SEVENTV_BASE.into(),
            default_ttl: Duration::from_secs(5 * 60),
            global_ttl: Duration::from_secs(60 * 60),
            cheermote_ttl: Duration::from_secs(12 * 60 * 60),
            cull_interval: Duration::from_secs(5 * 60),
            seventv_platform: "an-alca-chat-client".into(),
            seventv_version: "2.0.0".into(),
            user_agent: concat!("chat-assets/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ChatAssetsConfig {
    /// Defaults with `CHAT_ASSETS_*` environment overrides applied.
    ///
    /// Unparseable durations are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let bases: [(&str, &mut String); 4] = [
            ("CHAT_ASSETS_HELIX_BASE", &mut config.helix_base),
            ("CHAT_ASSETS_FFZ_BASE", &mut config.ffz_base),
            ("CHAT_ASSETS_BTTV_BASE", &mut config.bttv_base),
            ("CHAT_ASSETS_SEVENTV_BASE", &mut config.seventv_base),
        ];
        for (key, slot) in bases {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = v.trim_end_matches('/').to_string();
            }
        }

        let strings: [(&str, &mut String); 3] = [
            ("CHAT_ASSETS_SEVENTV_PLATFORM", &mut config.seventv_platform),
            ("CHAT_ASSETS_SEVENTV_VERSION", &mut config.seventv_version),
            ("CHAT_ASSETS_USER_AGENT", &mut config.user_agent),
        ];
        for (key, slot) in strings {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = v;
            }
        }

        let durations: [(&str, &mut Duration); 4] = [
            ("CHAT_ASSETS_DEFAULT_TTL_SECS", &mut config.default_ttl),
            ("CHAT_ASSETS_GLOBAL_TTL_SECS", &mut config.global_ttl),
            ("CHAT_ASSETS_CHEERMOTE_TTL_SECS", &mut config.cheermote_ttl),
            ("CHAT_ASSETS_CULL_INTERVAL_SECS", &mut config.cull_interval),
        ];
        for (key, slot) in durations {
            let Some(v) = lookup(key) else { continue };
            match v.parse::<u64>() {
                Ok(secs) => *slot = Duration::from_secs(secs),
                Err(e) => tracing::warn!(key, value = %v, "Ignoring invalid duration: {e}"),
            }
        }

        config
    }

    /// Check that every base URL parses.
    pub fn validate(&self) -> Result<(), AssetError> {
        for base in [
            &self.helix_base,
            &self.ffz_base,
            &self.bttv_base,
            &self.seventv_base,
        ] {
            Url::parse(base)?;
        }
        if self.cull_interval.is_zero() {
            tracing::warn!("Cull interval is zero; expired entries are only dropped on read");
        }
        Ok(())
    }
}
