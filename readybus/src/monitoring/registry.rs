use std::{fmt, sync::Arc};

use crate::{
    Payload,
    monitoring::{Monitor, MonitorDispatcher, MonitorHandle, MonitorId},
};

/// Registry for managing monitors attached to a bus.
///
/// Access via [`EventBus::monitors()`](crate::EventBus::monitors). Clones of
/// a bus share one registry.
///
/// # Example
///
/// ```rust
/// use readybus::EventBus;
/// use readybus::monitors::Tracer;
///
/// let bus = EventBus::<u32>::new();
/// let registry = bus.monitors();
///
/// // Add a monitor
/// let handle = registry.add(Tracer);
///
/// // Pause all monitors
/// registry.pause();
///
/// // Resume all monitors
/// registry.resume();
/// # handle.remove();
/// ```
pub struct MonitorRegistry<A: Payload> {
    dispatcher: Arc<MonitorDispatcher<A>>,
}

impl<A: Payload> MonitorRegistry<A> {
    pub(crate) fn new() -> Self {
        Self {
            dispatcher: Arc::new(MonitorDispatcher::new()),
        }
    }

    pub(crate) fn notify(&self, f: impl Fn(&dyn Monitor<A>)) {
        self.dispatcher.notify(f);
    }

    /// Register a new monitor and return a handle for controlling it.
    ///
    /// The monitor starts in the active (non-paused) state.
    pub fn add<M: Monitor<A> + 'static>(&self, monitor: M) -> MonitorHandle<A> {
        let id = self.dispatcher.add(Arc::new(monitor));
        MonitorHandle::new(id, Arc::clone(&self.dispatcher))
    }

    /// Remove a monitor by its ID.
    ///
    /// Prefer using [`MonitorHandle::remove()`] instead.
    pub fn remove(&self, id: MonitorId) -> bool {
        self.dispatcher.remove(id)
    }

    /// Pause all registered monitors.
    ///
    /// Paused monitors do not receive callbacks. Events continue to flow
    /// through the bus normally.
    pub fn pause(&self) {
        self.dispatcher.set_all_paused(true);
    }

    /// Resume all registered monitors.
    pub fn resume(&self) {
        self.dispatcher.set_all_paused(false);
    }

    /// Number of registered monitors, paused or not.
    pub fn len(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: Payload> fmt::Debug for MonitorRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
