//! Read-through cache for `GET` responses with pattern based invalidation.
mod client;
mod policy;

pub use self::policy::{InvalidationPolicy, ResourceRule};
use crate::types::cached::Cached;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use taskdesk_rest::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};

/// A [`Cached`] client reading through a shared [`ResponseCache`].
pub type CachedClient<T> = Cached<T, Arc<ResponseCache>>;

/// A snapshot of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CachedResponse {
    fn from_response(response: &Response<Vec<u8>>) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }
    pub fn to_response(&self) -> Response<Vec<u8>> {
        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

/// The cache key of a request: its method followed by the full URI, query string included.
///
/// Headers are not part of the key, so the same resource fetched under different
/// credentials shares one entry.
pub fn cache_key(method: &Method, uri: &Uri) -> String {
    format!("{method} {uri}")
}

/// The path and query part of a cache key, which is what invalidation patterns are matched against.
fn key_target(key: &str) -> &str {
    let uri = key.split_once(' ').map_or(key, |(_, uri)| uri);
    match uri.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => uri,
    }
}

fn is_read(method: &Method) -> bool {
    method == Method::GET
}

fn is_mutating(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

/// Responses to successful `GET` requests, kept until invalidated or cleared.
///
/// There is no expiry: an entry lives until a mutating request matches one of
/// the [`InvalidationPolicy`] patterns, or until [`clear_all`](Self::clear_all).
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CachedResponse>,
    policy: InvalidationPolicy,
}

impl ResponseCache {
    pub fn new(policy: InvalidationPolicy) -> Self {
        Self { entries: DashMap::new(), policy }
    }
    pub fn policy(&self) -> &InvalidationPolicy {
        &self.policy
    }
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Evicts every entry.
    pub fn clear_all(&self) {
        let count = self.entries.len();
        self.entries.clear();
        tracing::debug!(count, "response cache cleared");
    }
    /// Evicts every entry whose path or query contains any of `patterns`, returning how many
    /// were removed. Scheme and host are not matched.
    pub fn invalidate(&self, patterns: &[&str]) -> usize {
        if patterns.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !patterns.iter().any(|pattern| key_target(key).contains(pattern)));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(?patterns, removed, "response cache invalidated");
        }
        removed
    }
    fn evict_for(&self, path: &str) {
        if self.policy.is_session_ending(path) {
            self.clear_all();
        } else {
            self.invalidate(&self.policy.patterns_for(path));
        }
    }
    /// Runs `request` through the cache.
    ///
    /// A `GET` with a stored entry is answered from the cache and `proceed` is not
    /// called. Otherwise `proceed` sends the request; a successful `GET` response is
    /// stored, and a failed one leaves no entry behind. Mutating requests evict the
    /// entries matching their path, both before sending and after settling, and are
    /// never stored.
    pub async fn intercept<F, Fut, E>(
        &self,
        request: Request<Vec<u8>>,
        proceed: F,
    ) -> Result<Response<Vec<u8>>, E>
    where
        F: FnOnce(Request<Vec<u8>>) -> Fut,
        Fut: Future<Output = Result<Response<Vec<u8>>, E>>,
    {
        let method = request.method().clone();
        if is_read(&method) {
            let key = cache_key(&method, request.uri());
            if let Some(cached) = self.get(&key) {
                tracing::trace!(%key, "response cache hit");
                return Ok(cached.to_response());
            }
            let result = proceed(request).await;
            match &result {
                Ok(response) if response.status().is_success() => {
                    tracing::trace!(%key, "response cache store");
                    self.entries.insert(key, CachedResponse::from_response(response));
                }
                _ => {
                    self.entries.remove(&key);
                }
            }
            result
        } else if is_mutating(&method) {
            let path = request.uri().path().to_owned();
            self.evict_for(&path);
            let result = proceed(request).await;
            self.evict_for(&path);
            result
        } else {
            proceed(request).await
        }
    }
}
