use super::flag::ActivityFlag;
use futures::future::AbortHandle;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct State {
    generation: u64,
    holding: bool,
    in_flight: Option<AbortHandle>,
}

/// Per-operation bookkeeping: which invocation is the latest, whether this
/// operation currently holds its flag, and the abort handle of the call in flight.
#[derive(Debug)]
pub(crate) struct Tracker {
    flag: ActivityFlag,
    state: Mutex<State>,
}

impl Tracker {
    pub(crate) fn new(flag: ActivityFlag) -> Arc<Self> {
        Arc::new(Self { flag, state: Mutex::new(State::default()) })
    }
    pub(crate) fn flag(&self) -> &ActivityFlag {
        &self.flag
    }
    /// Registers a new invocation, which supersedes every earlier one.
    pub(crate) fn begin(self: &Arc<Self>) -> Ticket {
        let mut state = self.state.lock().expect("failed to lock tracker");
        state.generation += 1;
        if !state.holding {
            state.holding = true;
            self.flag.acquire();
        }
        Ticket { tracker: Arc::clone(self), generation: state.generation }
    }
    fn is_latest(&self, generation: u64) -> bool {
        self.state.lock().expect("failed to lock tracker").generation == generation
    }
    /// Aborts the call in flight and records `handle` in its place, if `generation`
    /// is still the latest. Otherwise `handle` is aborted and `false` returned.
    fn replace_in_flight(&self, generation: u64, handle: AbortHandle) -> bool {
        let mut state = self.state.lock().expect("failed to lock tracker");
        if state.generation != generation {
            handle.abort();
            return false;
        }
        if let Some(previous) = state.in_flight.replace(handle) {
            previous.abort();
        }
        true
    }
    fn release(&self, generation: u64) {
        let mut state = self.state.lock().expect("failed to lock tracker");
        if state.generation == generation && state.holding {
            state.holding = false;
            state.in_flight = None;
            self.flag.release();
        }
    }
}

/// Held by an invocation for its whole lifetime.
///
/// Dropping the ticket of the latest invocation releases the flag, whichever way
/// the invocation ended.
#[derive(Debug)]
pub(crate) struct Ticket {
    tracker: Arc<Tracker>,
    generation: u64,
}

impl Ticket {
    pub(crate) fn is_latest(&self) -> bool {
        self.tracker.is_latest(self.generation)
    }
    pub(crate) fn replace_in_flight(&self, handle: AbortHandle) -> bool {
        self.tracker.replace_in_flight(self.generation, handle)
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.tracker.release(self.generation);
    }
}
