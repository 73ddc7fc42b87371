use super::config::Config;
use super::TaskAgent;
use crate::error::{Error, Result};
use std::sync::Arc;
use taskdesk_api::agent::{Context, SessionManager, SessionMarker};
use taskdesk_api::rest::http::Uri;
use taskdesk_api::rest::RestClient;
use taskdesk_common::cache::ResponseCache;
use taskdesk_common::store::memory::MemoryStore;
use taskdesk_common::store::Store;
use taskdesk_common::types::cached::Cacheable;
#[cfg(feature = "default-client")]
use taskdesk_rest_client::reqwest::ReqwestClient;

/// A builder for creating a [`TaskAgent`].
pub struct TaskAgentBuilder<T, S = MemoryStore<(), SessionMarker>>
where
    T: RestClient + Send + Sync,
    S: Store<(), SessionMarker> + Send + Sync,
{
    config: Config,
    store: S,
    client: T,
}

impl<T> TaskAgentBuilder<T>
where
    T: RestClient + Send + Sync,
{
    /// Create a new builder with the given REST client.
    pub fn new(client: T) -> Self {
        Self { config: Config::default(), store: MemoryStore::default(), client }
    }
}

impl<T, S> TaskAgentBuilder<T, S>
where
    T: RestClient + Send + Sync + 'static,
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
{
    /// Set the configuration for the agent.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
    /// Set the session store for the agent.
    ///
    /// Returns a new builder with the session store set.
    pub fn store<S0>(self, store: S0) -> TaskAgentBuilder<T, S0>
    where
        S0: Store<(), SessionMarker> + Send + Sync,
    {
        TaskAgentBuilder { config: self.config, store, client: self.client }
    }
    /// Set the REST client for the agent.
    ///
    /// Returns a new builder with the REST client set.
    pub fn client<T0>(self, client: T0) -> TaskAgentBuilder<T0, S>
    where
        T0: RestClient + Send + Sync,
    {
        TaskAgentBuilder { config: self.config, store: self.store, client }
    }
    /// Build the agent.
    ///
    /// If the session store holds a session marker, the previous session is
    /// restored before this returns. Failing to restore it is not an error.
    pub async fn build(self) -> Result<TaskAgent<T, S>> {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        match endpoint.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => {}
            _ => return Err(Error::InvalidEndpoint(self.config.endpoint.clone())),
        }
        let ctx = Context {
            cache: Arc::new(ResponseCache::new(self.config.cache.clone())),
            ..Default::default()
        };
        let session = SessionManager::new(
            self.client.cached(Arc::clone(&ctx.cache)),
            self.store,
            ctx,
            self.config.session_options(),
        );
        session.configure_endpoint(endpoint.to_string());
        match session.silent_renewal().await {
            Ok(Some(_)) => tracing::info!("previous session restored"),
            Ok(None) => {}
            Err(err) => tracing::debug!(%err, "previous session could not be restored"),
        }
        Ok(TaskAgent::new(session))
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "default-client")))]
#[cfg(feature = "default-client")]
impl Default for TaskAgentBuilder<ReqwestClient, MemoryStore<(), SessionMarker>> {
    /// Create a new builder with the default client and session store.
    ///
    /// Default client is [`ReqwestClient`] and default session store is [`MemoryStore`].
    fn default() -> Self {
        Self::new(ReqwestClient::new(Config::default().endpoint))
    }
}
