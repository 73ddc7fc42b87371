use super::flag::ActivityFlag;
use super::tracker::Tracker;
use super::BoxedCall;
use futures::future::{AbortHandle, Abortable};
use std::future::Future;
use std::sync::Arc;

/// A query-class operation.
///
/// Invocations call the backend immediately and raise the shared loading flag
/// until the latest one settles. A new invocation aborts the call of the previous
/// one, so only the latest invocation ever yields a result.
pub struct Query<I, O, E> {
    name: &'static str,
    tracker: Arc<Tracker>,
    call: BoxedCall<I, O, E>,
}

impl<I, O, E> Clone for Query<I, O, E> {
    fn clone(&self) -> Self {
        Self { name: self.name, tracker: Arc::clone(&self.tracker), call: Arc::clone(&self.call) }
    }
}

impl<I, O, E> Query<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(name: &'static str, flag: ActivityFlag, call: BoxedCall<I, O, E>) -> Self {
        Self { name, tracker: Tracker::new(flag), call }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn flag(&self) -> &ActivityFlag {
        self.tracker.flag()
    }
    /// Registers an invocation and returns the future that carries it out.
    ///
    /// Resolves to `None` if a later invocation superseded this one, in which
    /// case the result of this call is discarded.
    pub fn invoke(&self, data: I) -> impl Future<Output = Option<Result<O, E>>> + Send + 'static {
        let ticket = self.tracker.begin();
        let (handle, registration) = AbortHandle::new_pair();
        ticket.replace_in_flight(handle);
        let call = Abortable::new((self.call)(data), registration);
        let name = self.name;
        async move {
            let result = match call.await {
                Ok(result) if ticket.is_latest() => Some(result),
                Ok(_) => None,
                Err(_) => {
                    tracing::trace!(operation = name, "query superseded");
                    None
                }
            };
            drop(ticket);
            result
        }
    }
}
