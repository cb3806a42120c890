use super::*;

/// Overlay channel badges onto global ones.
///
/// Versions of a set present in both are merged per version id, with the
/// channel's URL winning on conflict. Channel-only sets are added whole.
pub fn merge_badge_sets(global: &BadgeSets, channel: &BadgeSets) -> BadgeSets {
    let mut merged = global.clone();
    for (set_id, versions) in channel {
        let set = merged.entry(set_id.clone()).or_default();
        for (version, url) in versions {
            set.insert(version.clone(), url.clone());
        }
    }
    merged
}

impl ChatAssets {
    /// Global badges merged with the channel's own, cached per login.
    pub async fn load_badges(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<Arc<BadgeSets>, AssetError> {
        let key = format!("badges:final:{login}");
        let this = self.clone();
        let login = login.to_string();
        let id_hint = id_hint.map(str::to_string);

        self.inner
            .cache
            .get_or_add(&key, self.inner.default_ttl, move || async move {
                this.merged_badges(&login, id_hint.as_deref()).await
            })
            .await
    }

    async fn merged_badges(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<Arc<BadgeSets>, AssetError> {
        let helix = &self.inner.helix;
        let id = helix.resolve_id(login, id_hint).await?;
        let (global, channel) =
            tokio::try_join!(helix.get_badges_global(), helix.get_badges_channel(&id))?;

        let merged = merge_badge_sets(&global, &channel);
        tracing::debug!(login, sets = merged.len(), "Merged badge sets");
        Ok(Arc::new(merged))
    }
}
