use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Error, Listener, Payload, Result};

/// A listener that records every payload it is called with.
///
/// All listeners handed out by [`listener()`](Self::listener) share one
/// identity and one call log, so a spy can be subscribed, unsubscribed and
/// inspected like any other listener.
pub struct ListenerSpy<A: Payload> {
    calls: Arc<Mutex<Vec<A>>>,
    listener: Listener<A>,
}

impl<A: Payload> ListenerSpy<A> {
    /// A spy whose listener always succeeds.
    pub fn new() -> Self {
        Self::with_outcome(Ok(()))
    }

    /// A spy whose listener records the call, then fails with `error`.
    pub fn failing(error: Error) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&calls);
        let listener = Listener::new(move |args: &A| {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(args.clone());
            outcome.clone()
        });
        Self { calls, listener }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<A>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The spy's listener, ready to pass to a subscribe call.
    pub fn listener(&self) -> Listener<A> {
        self.listener.clone()
    }

    /// Payloads received so far, oldest first.
    pub fn calls(&self) -> Vec<A> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// The most recent payload.
    pub fn last(&self) -> Option<A> {
        self.lock().last().cloned()
    }

    /// Forget recorded calls. The listener keeps its identity.
    pub fn reset(&self) {
        self.lock().clear();
    }
}

impl<A: Payload> Default for ListenerSpy<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Payload> fmt::Debug for ListenerSpy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSpy")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}
