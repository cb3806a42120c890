use super::*;
use crate::helix::Cheermotes;

impl ChatAssets {
    /// The channel's cheermotes, cached per login for the cheermote TTL.
    pub async fn load_cheermotes(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<Arc<Cheermotes>, AssetError> {
        let key = format!("cheermotes:final:{login}");
        let this = self.clone();
        let login = login.to_string();
        let id_hint = id_hint.map(str::to_string);

        self.inner
            .cache
            .get_or_add(&key, self.inner.cheermote_ttl, move || async move {
                let id = this.inner.helix.resolve_id(&login, id_hint.as_deref()).await?;
                let cheermotes = this.inner.helix.get_cheermotes(&id).await?;
                Ok::<_, AssetError>(Arc::new(cheermotes))
            })
            .await
    }
}
