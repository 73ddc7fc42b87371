//! Coordination of backend calls behind shared busy flags.
//!
//! [`OperationFlags`] is created once per application and handed to every
//! component that issues backend calls. It hands out [`Submission`]s for
//! user-initiated writes and [`Query`]s for reads, one per logical operation.
mod flag;
mod query;
mod submission;
mod tracker;

pub use self::flag::ActivityFlag;
pub use self::query::Query;
pub use self::submission::{Submit, Submission};
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Quiet period applied to submissions unless configured otherwise.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

pub(crate) type BoxedCall<I, O, E> =
    Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, E>> + Send + Sync + 'static>;

fn boxed<I, O, E, F, Fut>(call: F) -> BoxedCall<I, O, E>
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    Arc::new(move |input| call(input).boxed())
}

/// The submitting and loading flags shared by every coordinated operation.
#[derive(Debug, Clone, Default)]
pub struct OperationFlags {
    pub submitting: ActivityFlag,
    pub loading: ActivityFlag,
}

impl OperationFlags {
    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
    /// Wraps `call` as a submission tracked by the submitting flag.
    pub fn submission<I, O, E, F, Fut>(
        &self,
        name: &'static str,
        quiet_period: Duration,
        call: F,
    ) -> Submission<I, O, E>
    where
        I: Send + 'static,
        O: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        Submission::new(name, self.submitting.clone(), quiet_period, boxed(call))
    }
    /// Wraps `call` as a query tracked by the loading flag.
    pub fn query<I, O, E, F, Fut>(&self, name: &'static str, call: F) -> Query<I, O, E>
    where
        I: Send + 'static,
        O: Send + 'static,
        E: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        Query::new(name, self.loading.clone(), boxed(call))
    }
}
