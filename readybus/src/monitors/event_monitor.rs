use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Error, EventName, Payload,
    monitoring::{Monitor, Store},
};

/// Monitor that counts publications and failures per event and tracks which
/// ready events have fired.
///
/// Register with the bus to passively observe it. Query at any time from any
/// thread through a clone.
///
/// ```rust
/// use readybus::EventBus;
/// use readybus::monitors::EventMonitor;
///
/// let bus = EventBus::<u8>::new();
/// let monitor = EventMonitor::new();
/// let query = monitor.clone();
/// bus.monitors().add(monitor);
///
/// bus.publish_ready("init", 1)?;
/// assert!(query.has_fired("init"));
/// assert_eq!(query.publish_count("init"), 1);
/// # Ok::<(), readybus::Error>(())
/// ```
#[derive(Clone)]
pub struct EventMonitor {
    inner: Arc<Mutex<EventMonitorInner>>,
}

#[derive(Default)]
struct EventMonitorInner {
    publish_counts: HashMap<EventName, usize>,
    failure_counts: HashMap<EventName, usize>,
    fired: HashSet<EventName>,
    replays: usize,
}

impl EventMonitor {
    /// Create a new `EventMonitor`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventMonitorInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventMonitorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of publish rounds observed for `event`, ready or not.
    pub fn publish_count(&self, event: &str) -> usize {
        self.lock().publish_counts.get(event).copied().unwrap_or(0)
    }

    /// Number of listener failures observed for `event`.
    pub fn failure_count(&self, event: &str) -> usize {
        self.lock().failure_counts.get(event).copied().unwrap_or(0)
    }

    /// Returns `true` if the ready event fired since the last purge.
    pub fn has_fired(&self, event: &str) -> bool {
        self.lock().fired.contains(event)
    }

    /// Returns a snapshot of ready events that fired since the last purge.
    pub fn fired_events(&self) -> Vec<EventName> {
        let mut fired: Vec<_> = self.lock().fired.iter().cloned().collect();
        fired.sort();
        fired
    }

    /// Number of late subscribers served from a latched payload.
    pub fn replay_count(&self) -> usize {
        self.lock().replays
    }
}

impl<A: Payload> Monitor<A> for EventMonitor {
    fn on_published(&self, event: &EventName, _args: &A, _listeners: usize) {
        let mut lock = self.lock();
        *lock.publish_counts.entry(event.clone()).or_insert(0) += 1;
    }

    fn on_latched(&self, event: &EventName, _args: &A) {
        self.lock().fired.insert(event.clone());
    }

    fn on_replayed(&self, _event: &EventName, _args: &A) {
        self.lock().replays += 1;
    }

    fn on_listener_failed(&self, event: &EventName, _position: usize, _error: &Error) {
        let mut lock = self.lock();
        *lock.failure_counts.entry(event.clone()).or_insert(0) += 1;
    }

    fn on_purged(&self, store: Store) {
        if store == Store::Ready {
            self.lock().fired.clear();
        }
    }
}

impl Default for EventMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lock = self.lock();
        f.debug_struct("EventMonitor")
            .field("events", &lock.publish_counts.len())
            .field("fired", &lock.fired.len())
            .field("replays", &lock.replays)
            .finish()
    }
}
