//! The task list, the selected task and the list filter.
mod filter;

use crate::error::Result;
use std::future::Future;
use std::sync::{Arc, RwLock};
use taskdesk_api::agent::events::Events;
use taskdesk_api::agent::{SessionManager, SessionMarker};
use taskdesk_api::rest::RestClient;
use taskdesk_api::types::tasks::{
    CreateTaskRequest, ExtractedTaskRequest, ExtractedTaskResponse, TaskFilterParams, TaskItem,
    TaskStatus, UpdateTaskRequest,
};
use taskdesk_api::Error;
use taskdesk_common::coordinator::{Query, Submission, Submit};
use taskdesk_common::store::Store;

pub use self::filter::apply as filter_tasks;

#[derive(Debug, Clone, Default)]
struct TasksState {
    tasks: Vec<TaskItem>,
    selected_task: Option<TaskItem>,
    filter_params: TaskFilterParams,
}

/// What the backend calls see: the session to send through, and the state to patch.
struct Shared<S, T> {
    session: SessionManager<S, T>,
    events: Events,
    state: Arc<RwLock<TasksState>>,
}

impl<S, T> Clone for Shared<S, T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, T> Shared<S, T>
where
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
    T: RestClient + Send + Sync + 'static,
{
    fn patch(&self, f: impl FnOnce(&mut TasksState)) {
        f(&mut self.state.write().expect("failed to write tasks state"));
    }
    async fn list(self, params: TaskFilterParams) -> core::result::Result<Vec<TaskItem>, Error> {
        Ok(self.session.api().tasks.list(params).await?)
    }
    async fn get(self, id: i64) -> core::result::Result<TaskItem, Error> {
        Ok(self.session.api().tasks.get(id).await?)
    }
    async fn create(self, input: CreateTaskRequest) -> core::result::Result<TaskItem, Error> {
        let task = self.session.api().tasks.create(input).await?;
        self.patch(|state| state.tasks.push(task.clone()));
        self.events.success("Task created successfully");
        Ok(task)
    }
    async fn update(
        self,
        (id, input): (i64, UpdateTaskRequest),
    ) -> core::result::Result<TaskItem, Error> {
        let task = self.session.api().tasks.update(id, input).await?;
        self.patch(|state| {
            replace(&mut state.tasks, &task);
            if state.selected_task.as_ref().is_some_and(|selected| selected.id == id) {
                state.selected_task = Some(task.clone());
            }
        });
        self.events.success("Task updated successfully");
        Ok(task)
    }
    async fn update_status(
        self,
        (id, status): (i64, TaskStatus),
    ) -> core::result::Result<TaskItem, Error> {
        let task = self.session.api().tasks.update_status(id, status).await?;
        self.patch(|state| {
            replace(&mut state.tasks, &task);
            state.selected_task = Some(task.clone());
        });
        self.events.success("Task status updated successfully");
        Ok(task)
    }
    async fn delete(self, id: i64) -> core::result::Result<(), Error> {
        self.session.api().tasks.delete(id).await?;
        self.patch(|state| state.tasks.retain(|task| task.id != id));
        self.events.success("Task deleted successfully");
        Ok(())
    }
    async fn create_from_extractions(
        self,
        extractions: Vec<ExtractedTaskRequest>,
    ) -> core::result::Result<ExtractedTaskResponse, Error> {
        let response = self.session.api().tasks.create_from_extractions(extractions).await?;
        self.patch(|state| state.tasks.extend(response.created_tasks.iter().cloned()));
        self.events.success(format!("{} tasks created successfully", response.summary.total_created));
        Ok(response)
    }
}

fn replace(tasks: &mut [TaskItem], updated: &TaskItem) {
    for task in tasks.iter_mut().filter(|task| task.id == updated.id) {
        *task = updated.clone();
    }
}

struct Inner<S, T> {
    shared: Shared<S, T>,
    list: Query<TaskFilterParams, Vec<TaskItem>, Error>,
    get: Query<i64, TaskItem, Error>,
    create: Submission<CreateTaskRequest, TaskItem, Error>,
    update: Submission<(i64, UpdateTaskRequest), TaskItem, Error>,
    update_status: Submission<(i64, TaskStatus), TaskItem, Error>,
    delete: Submission<i64, (), Error>,
    create_from_extractions: Submission<Vec<ExtractedTaskRequest>, ExtractedTaskResponse, Error>,
}

/// Keeps the user's tasks, the selected task and the list filter.
///
/// Reads are query-class: only the latest invocation updates the state.
/// Writes are submission-class: a burst within the quiet period results in one
/// backend call, and the state is updated once that call succeeds. Clones share
/// the same state.
pub struct TasksStore<S, T> {
    inner: Arc<Inner<S, T>>,
}

impl<S, T> Clone for TasksStore<S, T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S, T> TasksStore<S, T>
where
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
    T: RestClient + Send + Sync + 'static,
{
    pub fn new(session: SessionManager<S, T>) -> Self {
        let flags = session.flags().clone();
        let quiet_period = session.options().quiet_period;
        let shared = Shared {
            events: session.events().clone(),
            session,
            state: Arc::new(RwLock::new(TasksState::default())),
        };
        let inner = Inner {
            list: flags.query("get_tasks", {
                let shared = shared.clone();
                move |params| shared.clone().list(params)
            }),
            get: flags.query("get_task", {
                let shared = shared.clone();
                move |id| shared.clone().get(id)
            }),
            create: flags.submission("create_task", quiet_period, {
                let shared = shared.clone();
                move |input| shared.clone().create(input)
            }),
            update: flags.submission("update_task", quiet_period, {
                let shared = shared.clone();
                move |input| shared.clone().update(input)
            }),
            update_status: flags.submission("update_task_status", quiet_period, {
                let shared = shared.clone();
                move |input| shared.clone().update_status(input)
            }),
            delete: flags.submission("delete_task", quiet_period, {
                let shared = shared.clone();
                move |id| shared.clone().delete(id)
            }),
            create_from_extractions: flags.submission("create_tasks_from_extractions", quiet_period, {
                let shared = shared.clone();
                move |extractions| shared.clone().create_from_extractions(extractions)
            }),
            shared,
        };
        Self { inner: Arc::new(inner) }
    }
    /// Fetches the task list with `params`, or with the stored filter parameters if `None`.
    ///
    /// Returns `Ok(None)` if a later fetch superseded this one.
    pub async fn get_tasks(&self, params: Option<TaskFilterParams>) -> Result<Option<Vec<TaskItem>>> {
        let params = params.unwrap_or_else(|| self.filter_params());
        match self.inner.list.invoke(params).await {
            None => Ok(None),
            Some(Ok(tasks)) => {
                self.inner.shared.patch(|state| state.tasks = tasks.clone());
                Ok(Some(tasks))
            }
            Some(Err(err)) => {
                tracing::error!(%err, "failed to fetch tasks");
                Err(err.into())
            }
        }
    }
    /// Fetches one task and selects it.
    ///
    /// Returns `Ok(None)` if a later fetch superseded this one.
    pub async fn get_task(&self, id: i64) -> Result<Option<TaskItem>> {
        match self.inner.get.invoke(id).await {
            None => Ok(None),
            Some(Ok(task)) => {
                self.inner.shared.patch(|state| state.selected_task = Some(task.clone()));
                Ok(Some(task))
            }
            Some(Err(err)) => {
                tracing::error!(id, %err, "failed to fetch task");
                Err(err.into())
            }
        }
    }
    pub fn create_task(
        &self,
        input: impl Into<Submit<CreateTaskRequest, TaskItem, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.inner.create.invoke(input)
    }
    /// Applies a partial update to the task with the given id.
    pub fn update_task(
        &self,
        input: impl Into<Submit<(i64, UpdateTaskRequest), TaskItem, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.inner.update.invoke(input)
    }
    /// Moves a task to another status and selects it.
    pub fn update_task_status(
        &self,
        input: impl Into<Submit<(i64, TaskStatus), TaskItem, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.inner.update_status.invoke(input)
    }
    pub fn delete_task(
        &self,
        input: impl Into<Submit<i64, (), Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.inner.delete.invoke(input)
    }
    pub fn create_tasks_from_extractions(
        &self,
        input: impl Into<Submit<Vec<ExtractedTaskRequest>, ExtractedTaskResponse, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.inner.create_from_extractions.invoke(input)
    }
    /// Changes the stored filter parameters. Nothing is fetched.
    pub fn set_filter_params(&self, f: impl FnOnce(&mut TaskFilterParams)) {
        self.inner.shared.patch(|state| f(&mut state.filter_params));
    }
    pub fn reset_filter_params(&self) {
        self.inner.shared.patch(|state| state.filter_params = TaskFilterParams::default());
    }
    pub fn clear_selected_task(&self) {
        self.inner.shared.patch(|state| state.selected_task = None);
    }
    pub fn tasks(&self) -> Vec<TaskItem> {
        self.read(|state| state.tasks.clone())
    }
    pub fn selected_task(&self) -> Option<TaskItem> {
        self.read(|state| state.selected_task.clone())
    }
    pub fn filter_params(&self) -> TaskFilterParams {
        self.read(|state| state.filter_params.clone())
    }
    /// The task list with the stored filter parameters applied locally.
    pub fn filtered_tasks(&self) -> Vec<TaskItem> {
        self.read(|state| filter_tasks(&state.tasks, &state.filter_params))
    }
    fn read<R>(&self, f: impl FnOnce(&TasksState) -> R) -> R {
        f(&self.inner.shared.state.read().expect("failed to read tasks state"))
    }
}
