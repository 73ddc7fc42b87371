//! The dashboard summary.
use crate::error::Result;
use std::sync::{Arc, RwLock};
use taskdesk_api::agent::{SessionManager, SessionMarker};
use taskdesk_api::rest::RestClient;
use taskdesk_api::types::dashboard::TaskSummary;
use taskdesk_api::Error;
use taskdesk_common::coordinator::Query;
use taskdesk_common::store::Store;

struct Inner {
    summary: RwLock<Option<TaskSummary>>,
    load: Query<(), TaskSummary, Error>,
}

/// Keeps the last loaded [`TaskSummary`]. Clones share it.
#[derive(Clone)]
pub struct DashboardStore {
    inner: Arc<Inner>,
}

impl DashboardStore {
    pub fn new<S, T>(session: SessionManager<S, T>) -> Self
    where
        S: Store<(), SessionMarker> + Send + Sync + 'static,
        S::Error: Send + Sync + 'static,
        T: RestClient + Send + Sync + 'static,
    {
        let flags = session.flags().clone();
        let load = flags.query("load_summary", move |()| {
            let session = session.clone();
            async move { Ok::<_, Error>(session.api().dashboard.summary().await?) }
        });
        Self { inner: Arc::new(Inner { summary: RwLock::new(None), load }) }
    }
    /// Loads the summary and keeps it.
    ///
    /// Returns `Ok(None)` if a later load superseded this one.
    pub async fn load_summary(&self) -> Result<Option<TaskSummary>> {
        match self.inner.load.invoke(()).await {
            None => Ok(None),
            Some(Ok(summary)) => {
                self.inner
                    .summary
                    .write()
                    .expect("failed to write dashboard summary")
                    .replace(summary.clone());
                Ok(Some(summary))
            }
            Some(Err(err)) => {
                tracing::error!(%err, "failed to load the dashboard summary");
                Err(err.into())
            }
        }
    }
    pub fn summary(&self) -> Option<TaskSummary> {
        self.inner.summary.read().expect("failed to read dashboard summary").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{session, MockClient, TASK_1};
    use taskdesk_api::agent::events::{Event, Route};
    use taskdesk_api::rest::http::StatusCode;

    fn summary_body() -> String {
        format!(
            r#"{{"summary":"One task due soon.","metrics":{{"totalTasks":1,"dueToday":0,"dueThisWeek":1,"overdue":0,"byStatus":{{"Todo":1}},"byPriority":{{"High":1}},"byCategory":{{"Work":1}}}},"tasksToday":[],"upcomingTasks":[{TASK_1}],"generatedAt":"2025-02-25T08:00:00Z"}}"#
        )
    }

    #[tokio::test]
    async fn load_summary() -> Result<()> {
        let client = MockClient::default().with("GET /ai/summary", StatusCode::OK, summary_body());
        let counts = client.counts.clone();
        let store = DashboardStore::new(session(client));
        assert!(store.summary().is_none());
        let summary = store.load_summary().await?.expect("latest load");
        assert_eq!(summary.metrics.total_tasks, 1);
        assert_eq!(summary.upcoming_tasks.len(), 1);
        assert_eq!(store.summary(), Some(summary));
        store.load_summary().await?;
        assert_eq!(counts.get("GET /ai/summary"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn server_error_navigates() {
        let client = MockClient::default().with(
            "GET /ai/summary",
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"model unavailable"}"#,
        );
        let session = session(client);
        let mut rx = session.subscribe_events();
        let store = DashboardStore::new(session);
        assert!(store.load_summary().await.is_err());
        assert!(store.summary().is_none());
        assert_eq!(
            rx.try_recv().ok(),
            Some(Event::Navigate(Route::ServerError { message: Some(String::from("model unavailable")) }))
        );
    }
}
