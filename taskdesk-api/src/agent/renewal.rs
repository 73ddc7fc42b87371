use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A periodic timer of which at most one instance runs at a time.
#[derive(Debug, Default)]
pub(crate) struct RenewalTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RenewalTimer {
    /// Starts calling `tick` every `period`, replacing the running timer, if any.
    ///
    /// Must be called within a tokio runtime.
    pub(crate) fn arm<F>(&self, period: Duration, tick: F)
    where
        F: Fn() + Send + 'static,
    {
        let mut handle = self.handle.lock().expect("failed to lock renewal timer");
        if let Some(previous) = handle.take() {
            previous.abort();
        }
        handle.replace(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                tick();
            }
        }));
        tracing::debug!(?period, "renewal timer armed");
    }
    pub(crate) fn disarm(&self) {
        if let Some(handle) = self.handle.lock().expect("failed to lock renewal timer").take() {
            handle.abort();
            tracing::debug!("renewal timer disarmed");
        }
    }
    pub(crate) fn is_armed(&self) -> bool {
        self.handle.lock().expect("failed to lock renewal timer").is_some()
    }
}

impl Drop for RenewalTimer {
    fn drop(&mut self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}
