use std::collections::{HashMap, HashSet};

use futures::FutureExt;
use futures::future::try_join_all;

use super::models::{BadgesResponse, ProxyError};
use super::*;
use crate::cache::{Memo, memoize};
use crate::http::decode_envelope;

/// Upper bound of user ids per chat color request.
const COLOR_BATCH_LIMIT: usize = 100;

fn color_key(user_id: &str) -> String {
    format!("helix:color:{user_id}")
}

impl HelixProxy {
    /// Badges available in every channel.
    pub async fn get_badges_global(&self) -> Result<BadgeSets, AssetError> {
        let raw = self
            .request("chat/badges/global?simplify=true", self.global_ttl)
            .await?;
        let badges = decode_badges(&raw)?;
        tracing::debug!(sets = badges.len(), "Fetched global badges");
        Ok(badges)
    }

    /// Badges defined by one broadcaster.
    pub async fn get_badges_channel(&self, broadcaster_id: &str) -> Result<BadgeSets, AssetError> {
        let raw = self
            .request(
                &format!("chat/badges?broadcaster_id={broadcaster_id}&simplify=true"),
                self.default_ttl,
            )
            .await?;
        let badges = decode_badges(&raw)?;
        tracing::debug!(sets = badges.len(), broadcaster_id, "Fetched channel badges");
        Ok(badges)
    }

    /// Cheermotes usable in a broadcaster's chat, as the proxy returns them.
    pub async fn get_cheermotes(&self, broadcaster_id: &str) -> Result<Cheermotes, AssetError> {
        let raw = self
            .request(
                &format!("bits/cheermotes?broadcaster_id={broadcaster_id}&prefixes=true"),
                self.default_ttl,
            )
            .await?;
        if !raw.is_success() {
            return Err(AssetError::ApiError {
                status: raw.status,
                message: raw.body.to_string(),
            });
        }
        Ok(raw.body.clone())
    }

    /// Chat colors for a set of users. Users without a color are omitted.
    ///
    /// Colors are cached per user. Only ids missing from the cache are
    /// requested, batched up to 100 per request.
    pub async fn get_chat_colors(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, AssetError> {
        let mut seen = HashSet::new();
        let mut pending: Vec<(String, Memo<Option<String>>)> = Vec::new();
        let mut missing: Vec<String> = Vec::new();

        for id in user_ids.iter().filter(|id| !id.is_empty()) {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.cache.get::<Option<String>>(&color_key(id)) {
                Some(memo) => pending.push((id.clone(), memo)),
                None => missing.push(id.clone()),
            }
        }

        if !missing.is_empty() {
            tracing::debug!(
                cached = pending.len(),
                missing = missing.len(),
                "Fetching chat colors"
            );
        }

        for chunk in missing.chunks(COLOR_BATCH_LIMIT) {
            let batch = self.color_batch(chunk);
            for id in chunk {
                let wanted = id.clone();
                let per_user = memoize(
                    batch
                        .clone()
                        .map(move |res| res.map(|colors| colors.get(&wanted).cloned())),
                );
                let memo = self
                    .cache
                    .add_with_ttl(color_key(id), per_user, self.default_ttl);
                pending.push((id.clone(), memo));
            }
        }

        let resolved = try_join_all(
            pending
                .into_iter()
                .map(|(id, memo)| memo.map(move |res| res.map(|color| (id, color)))),
        )
        .await?;

        Ok(resolved
            .into_iter()
            .filter_map(|(id, color)| color.map(|c| (id, c)))
            .collect())
    }

    /// One request for `user_ids`, shared by the per-user cache entries.
    fn color_batch(&self, user_ids: &[String]) -> Memo<Arc<HashMap<String, String>>> {
        let query = user_ids
            .iter()
            .map(|id| format!("user_id={id}"))
            .collect::<Vec<_>>()
            .join("&");
        let request = HttpRequest::get(format!("{}/chat/color?{query}&colors=true", self.base));
        let fetched = self.fetcher.get(request);

        memoize(async move {
            let raw = fetched.await?;
            let colors: HashMap<String, String> =
                decode_envelope::<HashMap<String, Option<String>>, ProxyError>(SOURCE, &raw)?
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|(id, color)| color.filter(|c| !c.is_empty()).map(|c| (id, c)))
                    .collect();
            Ok(Arc::new(colors))
        })
    }
}

fn decode_badges(raw: &RawResponse) -> Result<BadgeSets, AssetError> {
    Ok(decode_envelope::<BadgesResponse, ProxyError>(SOURCE, raw)?
        .map(|resp| resp.badges)
        .unwrap_or_default())
}
