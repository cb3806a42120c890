//! Canned HTTP responses for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::AssetError;
use crate::http::{HttpFetch, HttpRequest, RawResponse};

/// Serves JSON per URL and counts how often each URL was requested.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    routes: Mutex<HashMap<String, Result<RawResponse, AssetError>>>,
    hits: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(RawResponse { status, body }));
    }

    pub(crate) fn ok(&self, url: &str, body: Value) {
        self.respond(url, 200, body);
    }

    pub(crate) fn fail(&self, url: &str, error: AssetError) {
        self.routes.lock().unwrap().insert(url.to_string(), Err(error));
    }

    pub(crate) fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub(crate) fn last_request(&self, url: &str) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.url == url)
            .cloned()
    }
}

impl HttpFetch for FakeFetcher {
    fn get(&self, request: HttpRequest) -> BoxFuture<'static, Result<RawResponse, AssetError>> {
        *self.hits.lock().unwrap().entry(request.url.clone()).or_default() += 1;
        let result = self
            .routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| {
                Err(AssetError::ApiError {
                    status: 599,
                    message: format!("no route for {}", request.url),
                })
            });
        self.requests.lock().unwrap().push(request);
        async move {
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }
}
