#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod agent;
pub mod dashboard;
mod error;
pub mod tasks;

pub use agent::TaskAgent;
pub use error::{Error, Result};
pub use taskdesk_api as api;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use taskdesk_api::agent::{Context, SessionManager, SessionMarker, SessionOptions};
    use taskdesk_api::rest::http::{Request, Response, StatusCode};
    use taskdesk_api::rest::{HttpClient, RestClient};
    use taskdesk_common::cache::CachedClient;
    use taskdesk_common::store::memory::MemoryStore;
    use taskdesk_common::types::cached::Cacheable;

    pub const TASK_1: &str = r#"{"id":1,"title":"Write report","description":"Quarterly numbers","dueDate":"2025-03-01","priority":3,"category":1,"status":1,"userId":"u1","createdAt":"2025-02-01T09:00:00Z"}"#;
    pub const TASK_2: &str = r#"{"id":2,"title":"buy milk","description":"","dueDate":null,"priority":1,"category":3,"status":2,"userId":"u1","createdAt":"2025-02-02T09:00:00Z"}"#;

    pub type TestStore = MemoryStore<(), SessionMarker>;
    pub type TestClient = CachedClient<MockClient>;
    pub type TestSession = SessionManager<TestStore, TestClient>;

    /// Request counts keyed by `"METHOD /path"`, shared with the client that records them.
    #[derive(Clone, Default)]
    pub struct Counts(Arc<Mutex<HashMap<String, usize>>>);

    impl Counts {
        pub fn get(&self, key: &str) -> usize {
            self.0.lock().expect("lock").get(key).copied().unwrap_or_default()
        }
        fn hit(&self, key: String) {
            *self.0.lock().expect("lock").entry(key).or_default() += 1;
        }
    }

    /// Serves canned JSON bodies keyed by `"METHOD /path"`, relative to the API base.
    #[derive(Default)]
    pub struct MockClient {
        responses: HashMap<&'static str, (StatusCode, String)>,
        pub counts: Counts,
    }

    impl MockClient {
        pub fn with(mut self, key: &'static str, status: StatusCode, body: impl Into<String>) -> Self {
            self.responses.insert(key, (status, body.into()));
            self
        }
    }

    impl HttpClient for MockClient {
        async fn send_http(
            &self,
            request: Request<Vec<u8>>,
        ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
        {
            let path = request.uri().path().trim_start_matches("/api");
            let key = format!("{} {path}", request.method());
            self.counts.hit(key.clone());
            let (status, body) = self
                .responses
                .get(key.as_str())
                .cloned()
                .unwrap_or((StatusCode::NOT_FOUND, String::new()));
            let mut builder = Response::builder().status(status);
            if !body.is_empty() {
                builder = builder.header("content-type", "application/json");
            }
            Ok(builder.body(body.into_bytes())?)
        }
    }

    impl RestClient for MockClient {
        fn base_uri(&self) -> String {
            String::from("http://localhost:5000/api")
        }
    }

    pub fn session(client: MockClient) -> TestSession {
        let ctx = Context::default();
        SessionManager::new(
            client.cached(ctx.cache.clone()),
            MemoryStore::default(),
            ctx,
            SessionOptions::default(),
        )
    }
}
