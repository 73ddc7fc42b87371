use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    holders: Mutex<usize>,
    tx: watch::Sender<bool>,
}

/// A shared busy flag.
///
/// The flag is `true` while at least one holder has acquired it. Clones refer to the
/// same flag.
#[derive(Debug, Clone)]
pub struct ActivityFlag {
    inner: Arc<Inner>,
}

impl Default for ActivityFlag {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self { inner: Arc::new(Inner { holders: Mutex::new(0), tx }) }
    }
}

impl ActivityFlag {
    pub fn get(&self) -> bool {
        *self.inner.tx.borrow()
    }
    /// Observe changes of the flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }
    pub(crate) fn acquire(&self) {
        let mut holders = self.inner.holders.lock().expect("failed to lock activity flag");
        *holders += 1;
        self.set(true);
    }
    pub(crate) fn release(&self) {
        let mut holders = self.inner.holders.lock().expect("failed to lock activity flag");
        *holders = holders.saturating_sub(1);
        if *holders == 0 {
            self.set(false);
        }
    }
    fn set(&self, value: bool) {
        self.inner.tx.send_if_modified(|current| {
            let modified = *current != value;
            *current = value;
            modified
        });
    }
}
