use std::{
    collections::BTreeMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    Payload,
    monitoring::{Monitor, MonitorId},
};

struct MonitorEntry<A: Payload> {
    monitor: Arc<dyn Monitor<A>>,
    paused: bool,
}

impl<A: Payload> MonitorEntry<A> {
    fn new(monitor: Arc<dyn Monitor<A>>) -> Self {
        Self {
            monitor,
            paused: false,
        }
    }
}

struct MonitorSet<A: Payload> {
    monitors: BTreeMap<MonitorId, MonitorEntry<A>>,
    last_id: MonitorId,
}

/// Holds the monitors of one bus and fans callbacks out to them.
///
/// Monitors are called outside the internal lock, so a monitor may add or
/// remove monitors from within a callback.
pub(crate) struct MonitorDispatcher<A: Payload> {
    set: Mutex<MonitorSet<A>>,
    is_active: AtomicBool,
}

impl<A: Payload> MonitorDispatcher<A> {
    pub fn new() -> Self {
        Self {
            set: Mutex::new(MonitorSet {
                monitors: BTreeMap::new(),
                last_id: 0,
            }),
            is_active: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorSet<A>> {
        self.set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_is_active(&self, set: &MonitorSet<A>) {
        let active = set.monitors.values().any(|m| !m.paused);
        self.is_active.store(active, Ordering::Relaxed);
    }

    pub fn add(&self, monitor: Arc<dyn Monitor<A>>) -> MonitorId {
        let mut set = self.lock();
        let id = set.last_id;
        set.monitors.insert(id, MonitorEntry::new(monitor));
        set.last_id = set.last_id.wrapping_add(1);
        self.update_is_active(&set);
        id
    }

    pub fn remove(&self, id: MonitorId) -> bool {
        let mut set = self.lock();
        let removed = set.monitors.remove(&id).is_some();
        self.update_is_active(&set);
        removed
    }

    pub fn set_paused(&self, id: MonitorId, paused: bool) {
        let mut set = self.lock();
        if let Some(entry) = set.monitors.get_mut(&id) {
            entry.paused = paused;
            self.update_is_active(&set);
        }
    }

    pub fn set_all_paused(&self, paused: bool) {
        let mut set = self.lock();
        for entry in set.monitors.values_mut() {
            entry.paused = paused;
        }
        self.update_is_active(&set);
    }

    pub fn len(&self) -> usize {
        self.lock().monitors.len()
    }

    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }

    pub fn notify(&self, f: impl Fn(&dyn Monitor<A>)) {
        if !self.is_active() {
            return;
        }

        let active: Vec<(MonitorId, Arc<dyn Monitor<A>>)> = self
            .lock()
            .monitors
            .iter()
            .filter(|(_, entry)| !entry.paused)
            .map(|(id, entry)| (*id, Arc::clone(&entry.monitor)))
            .collect();

        let mut ids_to_remove = Vec::new();
        for (id, monitor) in &active {
            let result = catch_unwind(AssertUnwindSafe(|| f(monitor.as_ref())));
            if result.is_err() {
                tracing::error!(monitor_id = %id, "Monitor panicked, removing");
                ids_to_remove.push(*id);
            }
        }

        for id in ids_to_remove {
            self.remove(id);
        }
    }
}

impl<A: Payload> fmt::Debug for MonitorDispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.lock();
        f.debug_struct("MonitorDispatcher")
            .field("monitors.len()", &set.monitors.len())
            .field("last_id", &set.last_id)
            .field("is_active", &self.is_active)
            .finish()
    }
}
