//! HTTP transport shared by the Helix proxy and emote providers.
//!
//! Responses are parsed as JSON whatever their status, because the
//! providers send their documented error envelopes with 4xx codes.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::AssetError;
use crate::cache::{ExpiringCache, Ttl};

/// A GET request with optional extra headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// A transported response whose body parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error for a response whose body matched neither data nor envelope.
    pub(crate) fn unrecognized(&self, provider: &'static str, e: impl std::fmt::Display) -> AssetError {
        if self.is_success() {
            AssetError::decode(provider, e)
        } else {
            AssetError::ApiError {
                status: self.status,
                message: self.body.to_string(),
            }
        }
    }
}

/// Something that can perform a GET and hand back parsed JSON.
pub trait HttpFetch: Send + Sync + 'static {
    fn get(&self, request: HttpRequest) -> BoxFuture<'static, Result<RawResponse, AssetError>>;
}

/// [`HttpFetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str) -> Result<Self, AssetError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        } else {
            tracing::warn!(user_agent, "Ignoring invalid user agent");
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { http })
    }

    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl HttpFetch for ReqwestFetcher {
    fn get(&self, request: HttpRequest) -> BoxFuture<'static, Result<RawResponse, AssetError>> {
        let http = self.http.clone();
        async move {
            let mut headers = HeaderMap::new();
            for (name, value) in &request.headers {
                match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                    (Ok(name), Ok(value)) => {
                        headers.insert(name, value);
                    }
                    _ => tracing::warn!(header = name, "Skipping invalid request header"),
                }
            }

            tracing::debug!(url = %request.url, "GET");
            let resp = http.get(&request.url).headers(headers).send().await?;
            let status = resp.status();
            let text = resp.text().await?;
            classify(status, text)
        }
        .boxed()
    }
}

/// JSON bodies pass through with their status. A non-JSON body is an
/// `ApiError` on failure statuses and a parse error on success.
fn classify(status: StatusCode, text: String) -> Result<RawResponse, AssetError> {
    match serde_json::from_str::<Value>(&text) {
        Ok(body) => Ok(RawResponse {
            status: status.as_u16(),
            body,
        }),
        Err(_) if !status.is_success() => Err(AssetError::ApiError {
            status: status.as_u16(),
            message: text,
        }),
        Err(e) => Err(e.into()),
    }
}

/// GET `request`, memoized in `cache` under its full URL.
pub(crate) async fn fetch_cached(
    cache: &ExpiringCache,
    fetcher: &Arc<dyn HttpFetch>,
    request: HttpRequest,
    ttl: Ttl,
) -> Result<Arc<RawResponse>, AssetError> {
    let key = request.url.clone();
    let fetcher = Arc::clone(fetcher);
    cache
        .get_or_add(&key, ttl, move || {
            fetcher.get(request).map(|res| res.map(Arc::new))
        })
        .await
}

/// A payload is either the source's documented error or the data.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T, E> {
    Error(E),
    Data(T),
}

/// Decode `raw` as data `T` or error envelope `E`.
///
/// `Ok(None)` is the envelope case; anything matching neither shape is an error.
pub(crate) fn decode_envelope<T, E>(
    source: &'static str,
    raw: &RawResponse,
) -> Result<Option<T>, AssetError>
where
    T: DeserializeOwned,
    E: DeserializeOwned + std::fmt::Debug,
{
    match Envelope::<T, E>::deserialize(&raw.body) {
        Ok(Envelope::Data(data)) => Ok(Some(data)),
        Ok(Envelope::Error(envelope)) => {
            tracing::warn!(
                source,
                status = raw.status,
                "Upstream returned an error envelope: {envelope:?}"
            );
            Ok(None)
        }
        Err(e) => Err(raw.unrecognized(source, e)),
    }
}
