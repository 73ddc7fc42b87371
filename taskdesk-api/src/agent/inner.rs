use super::events::Events;
use http::{Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use taskdesk_common::store::Store as StoreTrait;
use taskdesk_rest::types::AuthorizationToken;
use taskdesk_rest::{HttpClient, RestClient, RestRequest, RestResult};

/// Attaches the held credential and resolves paths against the configured endpoint.
pub struct WrapperClient<S, T> {
    store: Arc<Store<S>>,
    inner: Arc<T>,
}

impl<S, T> Clone for WrapperClient<S, T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), inner: Arc::clone(&self.inner) }
    }
}

impl<S, T> HttpClient for WrapperClient<S, T>
where
    S: Send + Sync,
    T: HttpClient + Send + Sync,
{
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        self.inner.send_http(request).await
    }
}

impl<S, T> RestClient for WrapperClient<S, T>
where
    S: Send + Sync,
    T: HttpClient + Send + Sync,
{
    fn base_uri(&self) -> String {
        self.store.get_endpoint()
    }
    async fn authorization_token(&self) -> Option<AuthorizationToken> {
        self.store.credential().map(AuthorizationToken::Bearer)
    }
}

/// The outbound pipeline used by the session manager and the stores.
///
/// Failed requests are classified and surfaced on the event channel before the
/// error is handed back to the caller.
pub struct Client<S, T> {
    inner: WrapperClient<S, T>,
    events: Events,
}

impl<S, T> Client<S, T>
where
    S: Send + Sync,
    T: HttpClient + Send + Sync,
{
    pub fn new(store: Arc<Store<S>>, rest: T, events: Events) -> Self {
        Self { inner: WrapperClient { store, inner: Arc::new(rest) }, events }
    }
    /// The same pipeline without error reporting.
    pub fn quiet(&self) -> WrapperClient<S, T> {
        self.inner.clone()
    }
}

impl<S, T> HttpClient for Client<S, T>
where
    S: Send + Sync,
    T: HttpClient + Send + Sync,
{
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        self.inner.send_http(request).await
    }
}

impl<S, T> RestClient for Client<S, T>
where
    S: Send + Sync,
    T: HttpClient + Send + Sync,
{
    fn base_uri(&self) -> String {
        self.inner.base_uri()
    }
    async fn send_rest<P, I, O>(&self, request: &RestRequest<P, I>) -> RestResult<O>
    where
        P: Serialize + Send + Sync,
        I: Serialize + Send + Sync,
        O: DeserializeOwned + Send + Sync,
    {
        let result = self.inner.send_rest(request).await;
        if let Err(err) = &result {
            tracing::warn!(method = %request.method, path = %request.path, %err, "request failed");
            self.events.report(err);
        }
        result
    }
}

/// Wraps the durable session store together with the volatile session data.
///
/// The credential lives only here, in memory.
pub struct Store<S> {
    inner: S,
    endpoint: RwLock<String>,
    credential: RwLock<Option<String>>,
}

impl<S> Store<S> {
    pub fn new(inner: S, initial_endpoint: String) -> Self {
        Self { inner, endpoint: RwLock::new(initial_endpoint), credential: RwLock::new(None) }
    }
    pub fn get_endpoint(&self) -> String {
        self.endpoint.read().expect("failed to read endpoint").clone()
    }
    pub fn set_endpoint(&self, endpoint: String) {
        *self.endpoint.write().expect("failed to write endpoint") =
            endpoint.trim_end_matches('/').into();
    }
    pub fn credential(&self) -> Option<String> {
        self.credential.read().expect("failed to read credential").clone()
    }
    pub fn set_credential(&self, credential: Option<String>) {
        *self.credential.write().expect("failed to write credential") = credential;
    }
}

impl<S, K, V> StoreTrait<K, V> for Store<S>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send,
    S: StoreTrait<K, V> + Sync,
{
    type Error = S::Error;

    async fn get(&self, key: &K) -> core::result::Result<Option<V>, Self::Error> {
        self.inner.get(key).await
    }
    async fn set(&self, key: K, value: V) -> core::result::Result<(), Self::Error> {
        self.inner.set(key, value).await
    }
    async fn del(&self, key: &K) -> core::result::Result<(), Self::Error> {
        self.inner.del(key).await
    }
    async fn clear(&self) -> core::result::Result<(), Self::Error> {
        self.inner.clear().await
    }
}
