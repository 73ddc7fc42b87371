//! Configuration for the [`TaskAgent`](super::TaskAgent).
mod file;

pub use self::file::FileStore;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use taskdesk_api::agent::SessionOptions;
use taskdesk_api::client::DEFAULT_ENDPOINT;
use taskdesk_api::common::cache::InvalidationPolicy;

/// Configuration data struct for the [`TaskAgent`](super::TaskAgent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The base URL of the API.
    pub endpoint: String,
    /// Seconds between background renewals of the credential.
    pub renewal_interval_secs: u64,
    /// Quiet period of submissions, in milliseconds.
    pub quiet_period_ms: u64,
    /// Which cached responses a mutation evicts.
    pub cache: InvalidationPolicy,
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader.load().await.map_err(Error::ConfigLoad)
    }
    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver.save(self).await.map_err(Error::ConfigSave)
    }
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            renewal_interval: Duration::from_secs(self.renewal_interval_secs),
            quiet_period: Duration::from_millis(self.quiet_period_ms),
        }
    }
}

impl Default for Config {
    /// Creates a new default configuration.
    ///
    /// The default configuration uses the base URL `http://localhost:5000/api`,
    /// renews every 14 minutes and debounces submissions for 300ms.
    fn default() -> Self {
        let options = SessionOptions::default();
        Self {
            endpoint: String::from(DEFAULT_ENDPOINT),
            renewal_interval_secs: options.renewal_interval.as_secs(),
            quiet_period_ms: options.quiet_period.as_millis() as u64,
            cache: InvalidationPolicy::default(),
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(
        &self,
        config: &Config,
    ) -> impl Future<
        Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.renewal_interval_secs, 840);
        assert_eq!(config.quiet_period_ms, 300);
        assert_eq!(config.session_options(), SessionOptions::default());
    }

    #[test]
    fn partial_config() {
        let config = serde_json::from_str::<Config>(r#"{"endpoint":"https://tasks.example.com/api"}"#)
            .expect("deserializing should succeed");
        assert_eq!(config.endpoint, "https://tasks.example.com/api");
        assert_eq!(config.quiet_period_ms, 300);
        assert_eq!(config.cache, InvalidationPolicy::default());
    }
}
