use super::flag::ActivityFlag;
use super::tracker::Tracker;
use super::BoxedCall;
use futures::future::{AbortHandle, Abortable};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// One invocation of a [`Submission`]: the input and the hooks to run once it settles.
pub struct Submit<I, O, E> {
    pub data: I,
    pub on_success: Option<Callback<O>>,
    pub on_error: Option<Callback<E>>,
}

impl<I, O, E> Submit<I, O, E> {
    pub fn new(data: I) -> Self {
        Self { data, on_success: None, on_error: None }
    }
    pub fn on_success(mut self, f: impl FnOnce(O) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }
    pub fn on_error(mut self, f: impl FnOnce(E) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl<I, O, E> From<I> for Submit<I, O, E> {
    fn from(data: I) -> Self {
        Self::new(data)
    }
}

/// A submission-class operation.
///
/// Every invocation raises the shared submitting flag and then waits for the quiet
/// period. Only an invocation that is still the latest once its quiet period has
/// elapsed calls the backend, so a burst of invocations results in one call: the
/// last one. Failures are logged and handed to `on_error`, never returned.
pub struct Submission<I, O, E> {
    name: &'static str,
    quiet_period: Duration,
    tracker: Arc<Tracker>,
    call: BoxedCall<I, O, E>,
}

impl<I, O, E> Clone for Submission<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            quiet_period: self.quiet_period,
            tracker: Arc::clone(&self.tracker),
            call: Arc::clone(&self.call),
        }
    }
}

impl<I, O, E> Submission<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Display + Send + 'static,
{
    pub(crate) fn new(
        name: &'static str,
        flag: ActivityFlag,
        quiet_period: Duration,
        call: BoxedCall<I, O, E>,
    ) -> Self {
        Self { name, quiet_period, tracker: Tracker::new(flag), call }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn flag(&self) -> &ActivityFlag {
        self.tracker.flag()
    }
    /// Registers an invocation and returns the future that carries it out.
    ///
    /// The flag is raised before this returns. The returned future completes once
    /// the invocation has settled or has been superseded.
    pub fn invoke(&self, submit: impl Into<Submit<I, O, E>>) -> impl Future<Output = ()> + Send + 'static {
        let Submit { data, on_success, on_error } = submit.into();
        let ticket = self.tracker.begin();
        let call = Arc::clone(&self.call);
        let name = self.name;
        let deadline = tokio::time::Instant::now() + self.quiet_period;
        async move {
            tokio::time::sleep_until(deadline).await;
            if !ticket.is_latest() {
                tracing::trace!(operation = name, "submission superseded");
                return;
            }
            let (handle, registration) = AbortHandle::new_pair();
            if !ticket.replace_in_flight(handle) {
                return;
            }
            match Abortable::new(call(data), registration).await {
                Ok(Ok(output)) => {
                    if let Some(f) = on_success {
                        f(output);
                    }
                }
                Ok(Err(err)) => {
                    tracing::error!(operation = name, %err, "submission failed");
                    if let Some(f) = on_error {
                        f(err);
                    }
                }
                Err(_) => {
                    tracing::debug!(operation = name, "submission aborted");
                }
            }
            drop(ticket);
        }
    }
    /// Spawns [`invoke`](Self::invoke) onto the current runtime.
    pub fn spawn(&self, submit: impl Into<Submit<I, O, E>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.invoke(submit))
    }
}
