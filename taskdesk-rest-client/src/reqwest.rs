#![doc = "RestClient implementation for [reqwest]"]
use reqwest::Client;
use std::sync::Arc;
use taskdesk_rest::http::{Request, Response};
use taskdesk_rest::{HttpClient, RestClient};

/// A [`reqwest`] based asynchronous client to make REST requests with.
///
/// You can also use [`ReqwestClientBuilder`] to supply your own [`reqwest::Client`].
/// When no client is supplied, one with a cookie store is created.
#[derive(Clone)]
pub struct ReqwestClient {
    base_uri: String,
    client: Arc<Client>,
}

impl ReqwestClient {
    /// Create a new [`ReqwestClient`] using the default configuration.
    pub fn new(base_uri: impl AsRef<str>) -> Self {
        ReqwestClientBuilder::new(base_uri).build()
    }
}

/// A client builder, capable of creating custom [`ReqwestClient`] instances.
pub struct ReqwestClientBuilder {
    base_uri: String,
    client: Option<Client>,
}

impl ReqwestClientBuilder {
    /// Create a new [`ReqwestClientBuilder`] for building a custom client.
    pub fn new(base_uri: impl AsRef<str>) -> Self {
        Self { base_uri: base_uri.as_ref().trim_end_matches('/').into(), client: None }
    }
    /// Sets the [`reqwest::Client`] to use.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }
    /// Build a [`ReqwestClient`] using the configured options.
    pub fn build(self) -> ReqwestClient {
        let client = self.client.unwrap_or_else(|| {
            Client::builder().cookie_store(true).build().unwrap_or_default()
        });
        ReqwestClient { base_uri: self.base_uri, client: Arc::new(client) }
    }
}

impl HttpClient for ReqwestClient {
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        let response = self.client.execute(request.try_into()?).await?;
        let mut builder = Response::builder().status(response.status());
        for (k, v) in response.headers() {
            builder = builder.header(k, v);
        }
        builder.body(response.bytes().await?.to_vec()).map_err(Into::into)
    }
}

impl RestClient for ReqwestClient {
    fn base_uri(&self) -> String {
        self.base_uri.clone()
    }
}
