use super::models::{ProxyError, UserLookupResponse};
use super::*;
use crate::http::decode_envelope;

impl HelixProxy {
    /// Get a user profile by login name.
    pub async fn get_user_by_login(&self, login: &str) -> Result<HelixUser, AssetError> {
        let raw = self
            .request(&format!("users?login={login}&user=true"), self.default_ttl)
            .await?;
        match decode_envelope::<UserLookupResponse, ProxyError>(SOURCE, &raw)? {
            Some(UserLookupResponse { user: Some(user) }) => Ok(user),
            None if raw.status >= 500 => Err(AssetError::ApiError {
                status: raw.status,
                message: raw.body.to_string(),
            }),
            _ => Err(AssetError::UserNotFound(login.to_string())),
        }
    }

    /// Canonical user id for `login`.
    ///
    /// A non-empty `id_hint` is returned as-is without touching the network.
    pub async fn resolve_id(&self, login: &str, id_hint: Option<&str>) -> Result<String, AssetError> {
        if let Some(id) = id_hint.filter(|id| !id.is_empty()) {
            tracing::trace!(login, id, "Using caller-supplied user id");
            return Ok(id.to_string());
        }
        let user = self.get_user_by_login(login).await?;
        tracing::debug!(login, id = %user.id, "Resolved user id");
        Ok(user.id)
    }
}
