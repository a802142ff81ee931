use std::{collections::HashMap, sync::Arc};

use super::ListenerEntry;
use crate::{EventName, Listener, Payload};

pub(crate) type Snapshot<A> = Vec<Arc<ListenerEntry<A>>>;

/// The two stores of a bus: transient subscriptions and latched ready
/// payloads. Always accessed under the bus lock.
#[derive(Debug)]
pub(crate) struct Registry<A: Payload> {
    subscriptions: HashMap<EventName, Snapshot<A>>,
    latched: HashMap<EventName, A>,
    initial_capacity: usize,
}

impl<A: Payload> Registry<A> {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            subscriptions: HashMap::new(),
            latched: HashMap::new(),
            initial_capacity,
        }
    }

    pub fn subscribe(&mut self, name: EventName, listener: Listener<A>) {
        let capacity = self.initial_capacity;
        self.subscriptions
            .entry(name)
            .or_insert_with(|| Vec::with_capacity(capacity))
            .push(Arc::new(ListenerEntry::new(listener)));
    }

    /// Removes the first entry registered with `listener`. Later duplicates
    /// of the same listener stay registered.
    pub fn unsubscribe(&mut self, name: &str, listener: &Listener<A>) -> bool {
        let Some(entries) = self.subscriptions.get_mut(name) else {
            return false;
        };
        match entries.iter().position(|e| e.listener().same_as(listener)) {
            Some(index) => {
                entries.remove(index).deactivate();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, name: &str) -> Snapshot<A> {
        self.subscriptions.get(name).cloned().unwrap_or_default()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.subscriptions.get(name).map_or(0, Vec::len)
    }

    pub fn latched(&self, name: &str) -> Option<&A> {
        self.latched.get(name)
    }

    /// Stores the payload of a ready event unless one is already latched.
    /// Returns `true` if `args` was stored.
    pub fn latch(&mut self, name: EventName, args: A) -> bool {
        if self.latched.contains_key(&name) {
            return false;
        }
        self.latched.insert(name, args);
        true
    }

    /// Drops every subscription. Rounds already in progress skip the
    /// dropped entries they have not reached yet.
    pub fn clear_subscriptions(&mut self) -> usize {
        let mut dropped = 0;
        for (_, entries) in self.subscriptions.drain() {
            dropped += entries.len();
            for entry in entries {
                entry.deactivate();
            }
        }
        dropped
    }

    pub fn clear_latched(&mut self) -> usize {
        let cleared = self.latched.len();
        self.latched.clear();
        cleared
    }

    /// Names known to either store, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = self
            .subscriptions
            .keys()
            .chain(self.latched.keys().filter(|n| !self.subscriptions.contains_key(*n)))
            .cloned()
            .collect();
        names.sort();
        names
    }
}
