use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Listener, Payload};

/// One registration of a listener under an event name.
///
/// Publish rounds iterate over a snapshot of entries, so an entry removed
/// mid-round is still in that snapshot. The `active` flag lets the round
/// skip it.
#[derive(Debug)]
pub(crate) struct ListenerEntry<A: Payload> {
    listener: Listener<A>,
    active: AtomicBool,
}

impl<A: Payload> ListenerEntry<A> {
    pub fn new(listener: Listener<A>) -> Self {
        Self {
            listener,
            active: AtomicBool::new(true),
        }
    }

    pub fn listener(&self) -> &Listener<A> {
        &self.listener
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}
