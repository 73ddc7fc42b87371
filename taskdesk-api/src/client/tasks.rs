use super::into_data;
use crate::types::tasks::{
    CreateFromExtractionRequest, CreateTaskRequest, ExtractedTaskRequest, ExtractedTaskResponse,
    TaskFilterParams, TaskItem, TaskStatus, UpdateTaskRequest,
};
use http::Method;
use std::sync::Arc;
use taskdesk_rest::{RestClient, RestRequest, Result};

/// Base path of the task resource. Every task mutation targets a path below it.
pub const BASE_PATH: &str = "/tasks";

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
    pub async fn list(&self, params: TaskFilterParams) -> Result<Vec<TaskItem>> {
        into_data(
            self.rest
                .send_rest::<_, (), _>(&RestRequest::get(BASE_PATH).with_parameters(params))
                .await?,
        )
    }
    pub async fn get(&self, id: i64) -> Result<TaskItem> {
        into_data(
            self.rest.send_rest::<(), (), _>(&RestRequest::get(format!("{BASE_PATH}/{id}"))).await?,
        )
    }
    pub async fn create(&self, input: CreateTaskRequest) -> Result<TaskItem> {
        into_data(
            self.rest.send_rest::<(), _, _>(&RestRequest::json(Method::POST, BASE_PATH, input)).await?,
        )
    }
    pub async fn update(&self, id: i64, input: UpdateTaskRequest) -> Result<TaskItem> {
        into_data(
            self.rest
                .send_rest::<(), _, _>(&RestRequest::json(
                    Method::PUT,
                    format!("{BASE_PATH}/{id}"),
                    input,
                ))
                .await?,
        )
    }
    /// The body is the bare status number.
    pub async fn update_status(&self, id: i64, status: TaskStatus) -> Result<TaskItem> {
        into_data(
            self.rest
                .send_rest::<(), _, _>(&RestRequest::json(
                    Method::PATCH,
                    format!("{BASE_PATH}/{id}/status"),
                    status,
                ))
                .await?,
        )
    }
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.rest
            .send_rest::<(), (), serde_json::Value>(&RestRequest::new(
                Method::DELETE,
                format!("{BASE_PATH}/{id}"),
            ))
            .await?;
        Ok(())
    }
    pub async fn create_from_extractions(
        &self,
        extractions: Vec<ExtractedTaskRequest>,
    ) -> Result<ExtractedTaskResponse> {
        into_data(
            self.rest
                .send_rest::<(), _, _>(&RestRequest::json(
                    Method::POST,
                    format!("{BASE_PATH}/create-from-extraction"),
                    CreateFromExtractionRequest { extractions },
                ))
                .await?,
        )
    }
}
