#![doc = "Typed endpoints of the taskdesk backend."]
pub mod auth;
pub mod dashboard;
pub mod tasks;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use taskdesk_rest::{Error, OutputDataOrBytes, RestClient, Result};

/// The API base used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api";

/// All endpoint groups, sharing one [`RestClient`].
pub struct Service<T> {
    pub auth: auth::Service<T>,
    pub tasks: tasks::Service<T>,
    pub dashboard: dashboard::Service<T>,
}

impl<T> Service<T>
where
    T: RestClient + Send + Sync,
{
    pub fn new(rest: Arc<T>) -> Self {
        Self {
            auth: auth::Service::new(Arc::clone(&rest)),
            tasks: tasks::Service::new(Arc::clone(&rest)),
            dashboard: dashboard::Service::new(rest),
        }
    }
}

fn into_data<O>(response: OutputDataOrBytes<O>) -> Result<O>
where
    O: DeserializeOwned,
{
    match response {
        OutputDataOrBytes::Data(data) => Ok(data),
        OutputDataOrBytes::Bytes(_) => Err(Error::UnexpectedResponseType),
    }
}
