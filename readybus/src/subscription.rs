use crate::{EventName, Listener, Payload};

/// Handle returned by [`EventBus::subscribe`](crate::EventBus::subscribe) and
/// [`EventBus::subscribe_ready`](crate::EventBus::subscribe_ready).
///
/// A subscription is a lookup key, not a guard: dropping it leaves the
/// listener registered. Pass it to
/// [`EventBus::unsubscribe`](crate::EventBus::unsubscribe) to remove the
/// listener. The same handle can be passed any number of times; only the
/// first call that finds a matching entry removes it.
#[derive(Debug, Clone)]
pub struct Subscription<A: Payload> {
    name: EventName,
    listener: Listener<A>,
}

impl<A: Payload> Subscription<A> {
    pub(crate) fn new(name: EventName, listener: Listener<A>) -> Self {
        Self { name, listener }
    }

    /// The event this subscription listens to.
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// The subscribed listener.
    pub fn listener(&self) -> &Listener<A> {
        &self.listener
    }
}
