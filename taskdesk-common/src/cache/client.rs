use super::{CachedClient, ResponseCache};
use std::sync::Arc;
use taskdesk_rest::http::{Request, Response};
use taskdesk_rest::types::AuthorizationToken;
use taskdesk_rest::{HttpClient, RestClient};

impl<T> HttpClient for CachedClient<T>
where
    T: HttpClient + Send + Sync,
{
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        let cache: &ResponseCache = &self.cache;
        cache.intercept(request, |request| self.inner.send_http(request)).await
    }
}

impl<T> RestClient for CachedClient<T>
where
    T: RestClient + Send + Sync,
{
    fn base_uri(&self) -> String {
        self.inner.base_uri()
    }
    async fn authorization_token(&self) -> Option<AuthorizationToken> {
        self.inner.authorization_token().await
    }
}

impl<T> CachedClient<T> {
    /// The cache shared by this client.
    pub fn response_cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }
}
