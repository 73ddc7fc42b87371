use super::events::{Event, Events, Route};
use super::inner;
use super::renewal::RenewalTimer;
use super::state::SessionState;
use crate::client::Service;
use crate::types::auth::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest, User};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;
use taskdesk_common::cache::ResponseCache;
use taskdesk_common::coordinator::{OperationFlags, Query, Submission, Submit, DEFAULT_QUIET_PERIOD};
use taskdesk_common::store::Store;
use taskdesk_rest::RestClient;
use tokio::sync::broadcast;

/// Renewal period used unless configured otherwise, shorter than the credential lifetime.
pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::from_secs(14 * 60);

/// The application wide instances shared by the session manager and every store.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub flags: OperationFlags,
    pub cache: Arc<ResponseCache>,
    pub events: Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub renewal_interval: Duration,
    pub quiet_period: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { renewal_interval: DEFAULT_RENEWAL_INTERVAL, quiet_period: DEFAULT_QUIET_PERIOD }
    }
}

/// The durable marker saying that a renewable session likely exists server-side.
///
/// It never carries the credential.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionMarker {
    pub since: DateTime<Utc>,
}

impl SessionMarker {
    pub fn now() -> Self {
        Self { since: Utc::now() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenewalMode {
    /// Once at startup. Failures are not reported.
    Silent,
    Manual,
    Background,
}

enum Credentials {
    Login(LoginRequest),
    Register(RegisterRequest),
}

struct Core<S, T> {
    store: Arc<inner::Store<S>>,
    api: Service<inner::Client<S, T>>,
    quiet_api: Service<inner::WrapperClient<S, T>>,
    ctx: Context,
    options: SessionOptions,
    state: RwLock<SessionState>,
    current_user: RwLock<Option<User>>,
    timer: RenewalTimer,
    /// Incremented whenever a session ends.
    epoch: AtomicU64,
    weak: Weak<Self>,
    login: Submission<LoginRequest, AuthResponse, Error>,
    register: Submission<RegisterRequest, AuthResponse, Error>,
    logout: Submission<(), ApiResponse, Error>,
    refresh: Query<(), AuthResponse, Error>,
    me: Query<(), User, Error>,
}

impl<S, T> Core<S, T>
where
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
    T: RestClient + Send + Sync + 'static,
{
    fn new(rest: T, store: S, ctx: Context, options: SessionOptions) -> Arc<Self> {
        let store = Arc::new(inner::Store::new(store, rest.base_uri()));
        let client = inner::Client::new(Arc::clone(&store), rest, ctx.events.clone());
        let quiet_api = Service::new(Arc::new(client.quiet()));
        let api = Service::new(Arc::new(client));
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let flags = &ctx.flags;
            let login = flags.submission("login", options.quiet_period, {
                let weak = weak.clone();
                move |input| {
                    let weak = weak.clone();
                    async move { upgrade(&weak)?.authenticate(Credentials::Login(input)).await }
                }
            });
            let register = flags.submission("register", options.quiet_period, {
                let weak = weak.clone();
                move |input| {
                    let weak = weak.clone();
                    async move { upgrade(&weak)?.authenticate(Credentials::Register(input)).await }
                }
            });
            let logout = flags.submission("logout", options.quiet_period, {
                let weak = weak.clone();
                move |()| {
                    let weak = weak.clone();
                    async move { upgrade(&weak)?.end_session().await }
                }
            });
            let refresh = flags.query("refresh", {
                let weak = weak.clone();
                move |()| {
                    let weak = weak.clone();
                    async move { Ok::<_, Error>(upgrade(&weak)?.api.auth.refresh().await?) }
                }
            });
            let me = flags.query("me", {
                let weak = weak.clone();
                move |()| {
                    let weak = weak.clone();
                    async move { Ok::<_, Error>(upgrade(&weak)?.api.auth.me().await?) }
                }
            });
            Self {
                store,
                api,
                quiet_api,
                ctx,
                options,
                state: RwLock::new(SessionState::default()),
                current_user: RwLock::new(None),
                timer: RenewalTimer::default(),
                epoch: AtomicU64::new(0),
                weak: weak.clone(),
                login,
                register,
                logout,
                refresh,
                me,
            }
        })
    }
    fn state(&self) -> SessionState {
        *self.state.read().expect("failed to read session state")
    }
    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
    fn set_state(&self, next: SessionState) {
        let previous =
            std::mem::replace(&mut *self.state.write().expect("failed to write session state"), next);
        if previous != next {
            tracing::debug!(%previous, %next, "session state changed");
        }
    }
    /// Moves to `next`. Entering `Active` (re-)arms the renewal timer and entering
    /// `Anonymous` disarms it.
    fn transition(&self, next: SessionState) {
        self.set_state(next);
        match next.arms_timer() {
            Some(true) => {
                let weak = self.weak.clone();
                self.timer.arm(self.options.renewal_interval, move || {
                    if let Some(core) = weak.upgrade() {
                        tokio::spawn(async move {
                            let _ = core.renew(RenewalMode::Background).await;
                        });
                    }
                });
            }
            Some(false) => self.timer.disarm(),
            None => {}
        }
    }
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthResponse> {
        let epoch = self.epoch();
        self.transition(SessionState::Authenticating);
        let (result, registering) = match credentials {
            Credentials::Login(input) => (self.api.auth.login(input).await, false),
            Credentials::Register(input) => (self.api.auth.register(input).await, true),
        };
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                // the running session, if any, continues on its current timer
                if self.store.credential().is_some() {
                    self.set_state(SessionState::Active);
                } else {
                    self.transition(SessionState::Anonymous);
                }
                return Err(err.into());
            }
        };
        if self.epoch() != epoch {
            tracing::debug!("session ended during authentication, credential discarded");
            return Err(Error::SessionEnded);
        }
        // the new identity starts from an empty cache
        self.ctx.cache.clear_all();
        self.establish(output.token.clone()).await;
        if self.fetch_identity().await?.is_some() && self.state() == SessionState::Active {
            if registering {
                self.ctx.events.success("Registered successfully.");
            } else {
                self.ctx.events.success(format!("Welcome back, {}!", output.name));
            }
        }
        Ok(output)
    }
    async fn establish(&self, credential: String) {
        self.store.set_credential(Some(credential));
        if let Err(err) = self.store.set((), SessionMarker::now()).await {
            tracing::warn!(%err, "failed to persist the session marker");
        }
        self.transition(SessionState::Active);
    }
    /// Returns `Ok(None)` if a later fetch superseded this one.
    async fn fetch_identity(&self) -> Result<Option<User>> {
        match self.me.invoke(()).await {
            None => Ok(None),
            Some(Ok(user)) => {
                self.current_user
                    .write()
                    .expect("failed to write current user")
                    .replace(user.clone());
                Ok(Some(user))
            }
            Some(Err(err)) => {
                tracing::error!(%err, "failed to fetch the current user");
                self.terminate().await;
                Err(err)
            }
        }
    }
    async fn renew(&self, mode: RenewalMode) -> Result<Option<AuthResponse>> {
        if mode == RenewalMode::Silent {
            match self.store.get(&()).await {
                Ok(Some(_)) => {}
                Ok(None) => return Ok(None),
                Err(err) => {
                    tracing::warn!(%err, "failed to read the session marker");
                    return Ok(None);
                }
            }
        }
        let epoch = self.epoch();
        self.transition(SessionState::Renewing);
        let result = match mode {
            RenewalMode::Silent => Some(self.quiet_api.auth.refresh().await.map_err(Error::from)),
            RenewalMode::Manual | RenewalMode::Background => self.refresh.invoke(()).await,
        };
        match result {
            // the later renewal settles the session
            None => Ok(None),
            Some(_) if self.epoch() != epoch => {
                tracing::debug!(?mode, "session ended during renewal, result discarded");
                Ok(None)
            }
            Some(Ok(output)) => {
                tracing::info!(?mode, "session renewed");
                self.establish(output.token.clone()).await;
                self.fetch_identity().await?;
                Ok(Some(output))
            }
            Some(Err(err)) => {
                if mode == RenewalMode::Silent {
                    tracing::debug!(%err, "silent renewal failed");
                } else {
                    tracing::error!(?mode, %err, "renewal failed");
                }
                self.terminate().await;
                Err(err)
            }
        }
    }
    async fn end_session(&self) -> Result<ApiResponse> {
        let output = self.api.auth.logout().await?;
        self.terminate().await;
        self.ctx.events.navigate(Route::Login);
        self.ctx.events.success("Logged out successfully.");
        Ok(output)
    }
    /// Local cleanup shared by logout and every fatal session failure.
    async fn terminate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.store.set_credential(None);
        self.current_user.write().expect("failed to write current user").take();
        self.transition(SessionState::Anonymous);
        if let Err(err) = self.store.del(&()).await {
            tracing::warn!(%err, "failed to delete the session marker");
        }
        self.ctx.cache.clear_all();
    }
}

fn upgrade<S, T>(weak: &Weak<Core<S, T>>) -> Result<Arc<Core<S, T>>> {
    weak.upgrade().ok_or(Error::SessionClosed)
}

/// Owns the authentication session: the in-memory credential, the durable
/// session marker, the current user and the background renewal timer.
///
/// Clones share the same session.
pub struct SessionManager<S, T> {
    core: Arc<Core<S, T>>,
}

impl<S, T> Clone for SessionManager<S, T> {
    fn clone(&self) -> Self {
        Self { core: Arc::clone(&self.core) }
    }
}

impl<S, T> SessionManager<S, T>
where
    S: Store<(), SessionMarker> + Send + Sync + 'static,
    S::Error: Send + Sync + 'static,
    T: RestClient + Send + Sync + 'static,
{
    /// `rest` should read through `ctx.cache` so that the cache is cleared together with the session.
    pub fn new(rest: T, store: S, ctx: Context, options: SessionOptions) -> Self {
        Self { core: Core::new(rest, store, ctx, options) }
    }
    /// Submits a login. The returned future settles once the submission has
    /// completed or was superseded by a later one.
    pub fn login(
        &self,
        input: impl Into<Submit<LoginRequest, AuthResponse, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.core.login.invoke(input)
    }
    pub fn register(
        &self,
        input: impl Into<Submit<RegisterRequest, AuthResponse, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.core.register.invoke(input)
    }
    pub fn logout(
        &self,
        input: impl Into<Submit<(), ApiResponse, Error>>,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.core.logout.invoke(input)
    }
    /// Fetches the current user. A failure ends the session locally.
    pub async fn fetch_current_user(&self) -> Result<Option<User>> {
        self.core.fetch_identity().await
    }
    /// Exchanges the refresh cookie for a new credential. A failure ends the session.
    ///
    /// Returns `Ok(None)` if a later renewal superseded this one, or if the
    /// session ended while the request was in flight.
    pub async fn refresh_token(&self) -> Result<Option<AuthResponse>> {
        self.core.renew(RenewalMode::Manual).await
    }
    /// Attempts to restore the session at startup.
    ///
    /// Makes no request unless the session marker is present. Failures end the
    /// session without emitting any event.
    pub async fn silent_renewal(&self) -> Result<Option<AuthResponse>> {
        self.core.renew(RenewalMode::Silent).await
    }
    pub fn state(&self) -> SessionState {
        self.core.state()
    }
    pub fn credential(&self) -> Option<String> {
        self.core.store.credential()
    }
    pub fn current_user(&self) -> Option<User> {
        self.core.current_user.read().expect("failed to read current user").clone()
    }
    pub fn is_logged_in(&self) -> bool {
        self.core.current_user.read().expect("failed to read current user").is_some()
    }
    pub fn is_renewal_armed(&self) -> bool {
        self.core.timer.is_armed()
    }
    pub async fn has_persisted_session(&self) -> Result<bool> {
        Ok(self.core.store.get(&()).await.map_err(|e| Error::SessionStore(Box::new(e)))?.is_some())
    }
    pub fn options(&self) -> SessionOptions {
        self.core.options
    }
    pub fn flags(&self) -> &OperationFlags {
        &self.core.ctx.flags
    }
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.core.ctx.cache
    }
    pub fn events(&self) -> &Events {
        &self.core.ctx.events
    }
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.core.ctx.events.subscribe()
    }
    /// The endpoints, going through the session's outbound pipeline.
    pub fn api(&self) -> &Service<inner::Client<S, T>> {
        &self.core.api
    }
    pub fn configure_endpoint(&self, endpoint: String) {
        self.core.store.set_endpoint(endpoint);
    }
    pub fn get_endpoint(&self) -> String {
        self.core.store.get_endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::events::{Notification, NotificationKind};
    use http::{Request, Response, StatusCode};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use taskdesk_common::cache::CachedClient;
    use taskdesk_common::store::memory::MemoryStore;
    use taskdesk_common::types::cached::Cacheable;
    use taskdesk_rest::HttpClient;
    use tokio::time::sleep;

    const ENDPOINT: &str = "http://localhost:5000/api";

    #[derive(Default)]
    struct Backend {
        counts: Mutex<HashMap<String, usize>>,
        authorization: Mutex<Vec<(String, Option<String>)>>,
        fail_login: AtomicBool,
        fail_refresh: AtomicBool,
        fail_me: AtomicBool,
    }

    impl Backend {
        fn count(&self, key: &str) -> usize {
            self.counts.lock().expect("lock").get(key).copied().unwrap_or_default()
        }
        fn total(&self) -> usize {
            self.counts.lock().expect("lock").values().sum()
        }
        fn authorization_of(&self, path: &str) -> Option<String> {
            self.authorization
                .lock()
                .expect("lock")
                .iter()
                .rev()
                .find(|(p, _)| p == path)
                .and_then(|(_, auth)| auth.clone())
        }
    }

    struct MockClient(Arc<Backend>);

    impl HttpClient for MockClient {
        async fn send_http(
            &self,
            request: Request<Vec<u8>>,
        ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
        {
            sleep(Duration::from_millis(10)).await;
            let path = request.uri().path().trim_start_matches("/api").to_string();
            let key = format!("{} {path}", request.method());
            let n = {
                let mut counts = self.0.counts.lock().expect("lock");
                let count = counts.entry(key.clone()).or_default();
                *count += 1;
                *count
            };
            self.0.authorization.lock().expect("lock").push((
                path.clone(),
                request
                    .headers()
                    .get(http::header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .map(String::from),
            ));
            let unauthorized = (StatusCode::UNAUTHORIZED, String::from(r#"{"message":"Unauthorized"}"#));
            let (status, body) = match key.as_str() {
                "POST /auth/login" | "POST /auth/register" => {
                    if self.0.fail_login.load(Ordering::SeqCst) {
                        unauthorized
                    } else {
                        (
                            StatusCode::OK,
                            String::from(r#"{"name":"A","email":"a@b.com","token":"T","expiresIn":900}"#),
                        )
                    }
                }
                "POST /auth/refresh" => {
                    if self.0.fail_refresh.load(Ordering::SeqCst) {
                        unauthorized
                    } else {
                        (
                            StatusCode::OK,
                            format!(r#"{{"name":"A","email":"a@b.com","token":"R{n}","expiresIn":900}}"#),
                        )
                    }
                }
                "GET /auth/me" => {
                    if self.0.fail_me.load(Ordering::SeqCst) {
                        unauthorized
                    } else {
                        (StatusCode::OK, String::from(r#"{"id":"u1","name":"A","email":"a@b.com"}"#))
                    }
                }
                "POST /auth/logout" => (StatusCode::OK, String::from(r#"{"success":true}"#)),
                "GET /tasks" => (StatusCode::OK, String::from("[]")),
                "GET /ai/summary" => (StatusCode::INTERNAL_SERVER_ERROR, String::from("{}")),
                _ => (StatusCode::NOT_FOUND, String::new()),
            };
            Ok(Response::builder()
                .status(status)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body.into_bytes())?)
        }
    }

    impl RestClient for MockClient {
        fn base_uri(&self) -> String {
            ENDPOINT.into()
        }
    }

    type Manager = SessionManager<MemoryStore<(), SessionMarker>, CachedClient<MockClient>>;

    fn manager() -> (Arc<Backend>, MemoryStore<(), SessionMarker>, Manager) {
        let backend = Arc::new(Backend::default());
        let store = MemoryStore::default();
        let ctx = Context::default();
        let client = MockClient(Arc::clone(&backend)).cached(Arc::clone(&ctx.cache));
        let manager = SessionManager::new(client, store.clone(), ctx, SessionOptions::default());
        (backend, store, manager)
    }

    fn login_request() -> LoginRequest {
        LoginRequest { email: String::from("a@b.com"), password: String::from("secret1") }
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn success(message: &str) -> Event {
        Event::Notification(Notification {
            kind: NotificationKind::Success,
            title: String::from("Success"),
            message: String::from(message),
        })
    }

    async fn assert_ended(manager: &Manager, store: &MemoryStore<(), SessionMarker>) {
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(manager.credential(), None);
        assert_eq!(manager.current_user(), None);
        assert!(!manager.is_renewal_armed());
        assert_eq!(store.get(&()).await.expect("get should succeed"), None);
        assert!(manager.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn login_establishes_session() {
        let (backend, store, manager) = manager();
        let mut events = manager.subscribe_events();
        let output = Arc::new(Mutex::new(None));
        let hook = Arc::clone(&output);
        manager
            .login(
                Submit::new(login_request())
                    .on_success(move |out| *hook.lock().expect("lock") = Some(out)),
            )
            .await;
        assert_eq!(output.lock().expect("lock").as_ref().map(|out| out.token.as_str()), Some("T"));
        assert_eq!(manager.credential().as_deref(), Some("T"));
        assert!(store.get(&()).await.expect("get should succeed").is_some());
        assert!(manager.has_persisted_session().await.expect("store should be readable"));
        assert!(manager.is_renewal_armed());
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(backend.count("GET /auth/me"), 1);
        assert_eq!(backend.authorization_of("/auth/me").as_deref(), Some("Bearer T"));
        assert_eq!(backend.authorization_of("/auth/login"), None);
        assert!(manager.is_logged_in());
        assert_eq!(drain(&mut events), vec![success("Welcome back, A!")]);
        assert!(!manager.flags().is_submitting());
        assert!(!manager.flags().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn register_establishes_session() {
        let (backend, _, manager) = manager();
        let mut events = manager.subscribe_events();
        manager
            .register(RegisterRequest {
                name: String::from("A"),
                email: String::from("a@b.com"),
                password: String::from("secret1"),
            })
            .await;
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(backend.count("POST /auth/register"), 1);
        assert_eq!(drain(&mut events), vec![success("Registered successfully.")]);
    }

    #[tokio::test(start_paused = true)]
    async fn login_failure_leaves_session_anonymous() {
        let (backend, store, manager) = manager();
        backend.fail_login.store(true, Ordering::SeqCst);
        let mut events = manager.subscribe_events();
        let failed = Arc::new(AtomicBool::new(false));
        let hook = Arc::clone(&failed);
        manager
            .login(
                Submit::new(login_request())
                    .on_error(move |_| hook.store(true, Ordering::SeqCst)),
            )
            .await;
        assert!(failed.load(Ordering::SeqCst));
        assert_ended(&manager, &store).await;
        assert_eq!(backend.count("GET /auth/me"), 0);
        assert!(matches!(
            drain(&mut events).as_slice(),
            [Event::Notification(Notification { kind: NotificationKind::Error, .. })]
        ));
        assert!(!manager.flags().is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn login_burst_sends_one_request() {
        let (backend, _, manager) = manager();
        let handles = (0..3)
            .map(|_| tokio::spawn(manager.login(login_request())))
            .collect::<Vec<_>>();
        assert!(manager.flags().is_submitting());
        for handle in handles {
            handle.await.expect("task should not panic");
        }
        assert_eq!(backend.count("POST /auth/login"), 1);
        assert!(!manager.flags().is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn identity_failure_ends_session() {
        let (backend, store, manager) = manager();
        backend.fail_me.store(true, Ordering::SeqCst);
        manager.login(login_request()).await;
        assert_ended(&manager, &store).await;
        assert_eq!(backend.count("POST /auth/login"), 1);
        assert_eq!(backend.count("POST /auth/logout"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_renewal_failure_ends_session() {
        let (backend, store, manager) = manager();
        manager.login(login_request()).await;
        backend.fail_refresh.store(true, Ordering::SeqCst);
        manager.refresh_token().await.expect_err("renewal should fail");
        assert_ended(&manager, &store).await;
    }

    #[tokio::test(start_paused = true)]
    async fn background_renewal_failure_ends_session() {
        let (backend, store, manager) = manager();
        manager.login(login_request()).await;
        backend.fail_refresh.store(true, Ordering::SeqCst);
        sleep(DEFAULT_RENEWAL_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(backend.count("POST /auth/refresh"), 1);
        assert_ended(&manager, &store).await;
    }

    #[tokio::test(start_paused = true)]
    async fn background_renewal_rearms_timer() {
        let (backend, _, manager) = manager();
        manager.login(login_request()).await;
        sleep(DEFAULT_RENEWAL_INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(backend.count("POST /auth/refresh"), 0);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(backend.count("POST /auth/refresh"), 1);
        assert_eq!(manager.credential().as_deref(), Some("R1"));
        assert_eq!(manager.state(), SessionState::Active);
        assert!(manager.is_renewal_armed());
        sleep(DEFAULT_RENEWAL_INTERVAL).await;
        assert_eq!(backend.count("POST /auth/refresh"), 2);
        assert_eq!(backend.authorization_of("/auth/refresh").as_deref(), Some("Bearer R1"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_renewal_without_marker_makes_no_calls() {
        let (backend, _, manager) = manager();
        assert_eq!(manager.silent_renewal().await.expect("should not fail"), None);
        assert_eq!(backend.total(), 0);
        assert_eq!(manager.state(), SessionState::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_renewal_restores_session() {
        let (backend, store, manager) = manager();
        store.set((), SessionMarker::now()).await.expect("set should succeed");
        let output = manager.silent_renewal().await.expect("renewal should succeed");
        assert_eq!(output.map(|out| out.token).as_deref(), Some("R1"));
        assert_eq!(manager.state(), SessionState::Active);
        assert!(manager.is_renewal_armed());
        assert_eq!(backend.count("GET /auth/me"), 1);
        assert_eq!(manager.current_user().map(|user| user.id).as_deref(), Some("u1"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_renewal_failure_is_not_reported() {
        let (backend, store, manager) = manager();
        store.set((), SessionMarker::now()).await.expect("set should succeed");
        backend.fail_refresh.store(true, Ordering::SeqCst);
        let mut events = manager.subscribe_events();
        manager.silent_renewal().await.expect_err("renewal should fail");
        assert_ended(&manager, &store).await;
        assert!(drain(&mut events).is_empty());
        assert!(!manager.flags().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_cache_and_session() {
        let (backend, store, manager) = manager();
        manager.login(login_request()).await;
        for _ in 0..2 {
            manager.api().tasks.list(Default::default()).await.expect("list should succeed");
        }
        assert_eq!(backend.count("GET /tasks"), 1);
        // the identity response is cached as well
        assert_eq!(manager.cache().len(), 2);

        let mut events = manager.subscribe_events();
        manager.logout(()).await;
        assert_ended(&manager, &store).await;
        assert_eq!(
            drain(&mut events),
            vec![Event::Navigate(Route::Login), success("Logged out successfully.")]
        );
        manager.api().tasks.list(Default::default()).await.expect("list should succeed");
        assert_eq!(backend.count("GET /tasks"), 2);
        assert_eq!(backend.authorization_of("/tasks"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn second_login_starts_from_empty_cache() {
        let (backend, _, manager) = manager();
        manager.login(login_request()).await;
        manager.api().tasks.list(Default::default()).await.expect("list should succeed");
        manager
            .login(LoginRequest {
                email: String::from("other@b.com"),
                password: String::from("secret2"),
            })
            .await;
        manager.api().tasks.list(Default::default()).await.expect("list should succeed");
        assert_eq!(backend.count("POST /auth/login"), 2);
        assert_eq!(backend.count("GET /auth/me"), 2);
        assert_eq!(backend.count("GET /tasks"), 2);
        assert_eq!(manager.state(), SessionState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn renewal_settling_after_logout_is_discarded() {
        let (backend, store, manager) = manager();
        manager.login(login_request()).await;
        let logout = tokio::spawn(manager.logout(()));
        // the logout request is in flight from 300ms to 310ms
        sleep(Duration::from_millis(305)).await;
        let refresh = tokio::spawn({
            let manager = manager.clone();
            async move { manager.refresh_token().await }
        });
        logout.await.expect("task should not panic");
        let output = refresh.await.expect("task should not panic");
        assert!(matches!(output, Ok(None)));
        assert_eq!(backend.count("POST /auth/logout"), 1);
        assert_eq!(backend.count("POST /auth/refresh"), 1);
        assert_ended(&manager, &store).await;
        sleep(DEFAULT_RENEWAL_INTERVAL * 2).await;
        assert_eq!(backend.count("POST /auth/refresh"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_login_keeps_running_session() {
        let (backend, _, manager) = manager();
        manager.login(login_request()).await;
        sleep(Duration::from_secs(10 * 60)).await;
        backend.fail_login.store(true, Ordering::SeqCst);
        manager.login(login_request()).await;
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(manager.credential().as_deref(), Some("T"));
        assert!(manager.is_renewal_armed());
        // still on the timer armed by the first login
        sleep(Duration::from_secs(4 * 60)).await;
        assert_eq!(backend.count("POST /auth/refresh"), 1);
        assert_eq!(manager.credential().as_deref(), Some("R1"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_requests_are_reported() {
        let (_, _, manager) = manager();
        let mut events = manager.subscribe_events();
        manager.api().dashboard.summary().await.expect_err("summary should fail");
        assert_eq!(
            drain(&mut events),
            vec![Event::Navigate(Route::ServerError { message: None })]
        );
    }

    #[tokio::test]
    async fn configure_endpoint() {
        let (_, _, manager) = manager();
        assert_eq!(manager.get_endpoint(), ENDPOINT);
        manager.configure_endpoint(String::from("https://tasks.example.com/api/"));
        assert_eq!(manager.get_endpoint(), "https://tasks.example.com/api");
    }
}
