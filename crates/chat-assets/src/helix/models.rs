use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Badge set id -> version id -> image URL.
pub type BadgeSets = HashMap<String, HashMap<String, String>>;

/// Cheermote payload, passed through to the renderer untouched.
pub type Cheermotes = serde_json::Value;

/// A Twitch user as returned by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserLookupResponse {
    #[serde(default)]
    pub(super) user: Option<HelixUser>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BadgesResponse {
    pub(super) badges: BadgeSets,
}

/// Error body the proxy sends instead of data.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(super) struct ProxyError {
    pub(super) error: String,
    #[serde(default)]
    pub(super) message: Option<String>,
}
