use super::into_data;
use crate::types::dashboard::TaskSummary;
use std::sync::Arc;
use taskdesk_rest::{RestClient, RestRequest, Result};

pub const SUMMARY: &str = "/ai/summary";

pub struct Service<T> {
    pub(crate) rest: Arc<T>,
}

impl<T> Service<T>
where
    T: RestClient + Send + Sync,
{
    pub(crate) fn new(rest: Arc<T>) -> Self {
        Self { rest }
    }
    pub async fn summary(&self) -> Result<TaskSummary> {
        into_data(self.rest.send_rest::<(), (), _>(&RestRequest::get(SUMMARY)).await?)
    }
}
