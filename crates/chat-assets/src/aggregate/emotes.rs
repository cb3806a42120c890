use super::*;
use crate::emotes::{ChannelIdentity, Emote, EmoteProvider};

impl ChatAssets {
    /// Every third-party emote usable in `login`'s chat, cached per login.
    ///
    /// Lists are concatenated in a fixed order: 7TV global, 7TV channel,
    /// BTTV global, BTTV channel, FFZ global, FFZ channel.
    pub async fn load_emotes(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<Arc<Vec<Emote>>, AssetError> {
        let key = format!("emotes:final:{login}");
        let this = self.clone();
        let login = login.to_string();
        let id_hint = id_hint.map(str::to_string);

        self.inner
            .cache
            .get_or_add(&key, self.inner.default_ttl, move || async move {
                this.merged_emotes(&login, id_hint.as_deref()).await
            })
            .await
    }

    async fn merged_emotes(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<Arc<Vec<Emote>>, AssetError> {
        let channel = self.channel_identity(login, id_hint).await?;
        let inner = &self.inner;

        let (sg, sc, bg, bc, fg, fc) = tokio::try_join!(
            inner.seventv.load_global(),
            inner.seventv.load_for_channel(&channel),
            inner.bttv.load_global(),
            inner.bttv.load_for_channel(&channel),
            inner.ffz.load_global(),
            inner.ffz.load_for_channel(&channel),
        )?;

        tracing::debug!(
            login = %channel.login,
            seventv = sg.len() + sc.len(),
            bttv = bg.len() + bc.len(),
            ffz = fg.len() + fc.len(),
            "Merged channel emotes"
        );
        let emotes: Vec<Emote> = [sg, sc, bg, bc, fg, fc].into_iter().flatten().collect();
        Ok(Arc::new(emotes))
    }

    /// Id and canonical login for a channel. With an id hint the login is
    /// taken as given; otherwise both come from the user lookup.
    async fn channel_identity(
        &self,
        login: &str,
        id_hint: Option<&str>,
    ) -> Result<ChannelIdentity, AssetError> {
        match id_hint.filter(|id| !id.is_empty()) {
            Some(id) => Ok(ChannelIdentity::new(id, login)),
            None => {
                let user = self.inner.helix.get_user_by_login(login).await?;
                Ok(ChannelIdentity::new(user.id, user.login))
            }
        }
    }
}
