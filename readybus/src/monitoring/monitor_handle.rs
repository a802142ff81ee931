use std::{fmt, sync::Arc};

use crate::{
    Payload,
    monitoring::{MonitorDispatcher, MonitorId},
};

/// Handle to a registered monitor.
///
/// Returned by [`MonitorRegistry::add`](crate::monitoring::MonitorRegistry::add).
/// Dropping the handle keeps the monitor registered.
pub struct MonitorHandle<A: Payload> {
    id: MonitorId,
    dispatcher: Arc<MonitorDispatcher<A>>,
}

impl<A: Payload> MonitorHandle<A> {
    pub(crate) fn new(id: MonitorId, dispatcher: Arc<MonitorDispatcher<A>>) -> Self {
        Self { id, dispatcher }
    }

    pub fn id(&self) -> MonitorId {
        self.id
    }

    /// Stop delivering callbacks to this monitor until resumed.
    pub fn pause(&self) {
        self.dispatcher.set_paused(self.id, true);
    }

    pub fn resume(&self) {
        self.dispatcher.set_paused(self.id, false);
    }

    /// Unregister the monitor.
    pub fn remove(self) {
        self.dispatcher.remove(self.id);
    }
}

impl<A: Payload> fmt::Debug for MonitorHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
