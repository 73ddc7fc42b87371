//! Implementation of [`TaskAgent`] and its builder.
mod builder;
pub mod config;
pub mod store;

pub use self::builder::TaskAgentBuilder;
use self::config::Config;
use crate::dashboard::DashboardStore;
use crate::tasks::TasksStore;
use std::ops::Deref;
use taskdesk_api::agent::{SessionManager, SessionMarker};
use taskdesk_api::rest::RestClient;
use taskdesk_common::cache::CachedClient;
use taskdesk_common::store::memory::MemoryStore;
use taskdesk_common::store::Store;
#[cfg(feature = "default-client")]
use taskdesk_rest_client::reqwest::ReqwestClient;

/// The main entry point of the SDK.
///
/// Dereferences to the [`SessionManager`], so session operations such as
/// [`login`](SessionManager::login) are called on the agent directly. The task
/// and dashboard stores share the session's outbound pipeline, cache and flags.
pub struct TaskAgent<T, S = MemoryStore<(), SessionMarker>>
where
    T: RestClient + Send + Sync + 'static,
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
{
    session: SessionManager<S, CachedClient<T>>,
    pub tasks: TasksStore<S, CachedClient<T>>,
    pub dashboard: DashboardStore,
}

#[cfg_attr(docsrs, doc(cfg(feature = "default-client")))]
#[cfg(feature = "default-client")]
impl TaskAgent<ReqwestClient> {
    /// Create a new [`TaskAgentBuilder`] with the default client and session store.
    pub fn builder() -> TaskAgentBuilder<ReqwestClient, MemoryStore<(), SessionMarker>> {
        TaskAgentBuilder::default()
    }
}

impl<T, S> TaskAgent<T, S>
where
    T: RestClient + Send + Sync + 'static,
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
{
    pub(crate) fn new(session: SessionManager<S, CachedClient<T>>) -> Self {
        Self {
            tasks: TasksStore::new(session.clone()),
            dashboard: DashboardStore::new(session.clone()),
            session,
        }
    }
    /// Get the current configuration of the agent.
    ///
    /// The session itself is not part of it: it is restored from the session store.
    pub fn to_config(&self) -> Config {
        let options = self.options();
        Config {
            endpoint: self.get_endpoint(),
            renewal_interval_secs: options.renewal_interval.as_secs(),
            quiet_period_ms: options.quiet_period.as_millis() as u64,
            cache: self.cache().policy().clone(),
        }
    }
}

impl<T, S> Deref for TaskAgent<T, S>
where
    T: RestClient + Send + Sync + 'static,
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
{
    type Target = SessionManager<S, CachedClient<T>>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}
