use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use tracing::{debug, trace, warn};

use crate::{
    BusConfig, Error, EventName, FailurePolicy, Listener, ListenerFailure, Payload, Result,
    Subscription,
    internal::{ListenerEntry, Registry, Snapshot},
};

#[cfg(feature = "monitoring")]
use crate::monitoring::{MonitorRegistry, Store};

struct Shared<A: Payload> {
    registry: Mutex<Registry<A>>,
    config: BusConfig,

    #[cfg(feature = "monitoring")]
    monitoring: MonitorRegistry<A>,
}

/// Publish/subscribe bus with latched ready events.
///
/// The bus owns two stores, both keyed by [`EventName`]:
///
/// - **subscriptions**: listeners registered with [`subscribe`](Self::subscribe),
///   invoked in registration order by every [`publish`](Self::publish).
/// - **ready events**: the payload of the first [`publish_ready`](Self::publish_ready)
///   for a name. Later `publish_ready` calls for that name do nothing, and
///   [`subscribe_ready`](Self::subscribe_ready) delivers the stored payload
///   immediately instead of waiting.
///
/// # Example
///
/// ```rust
/// use readybus::{EventBus, Listener};
///
/// let bus = EventBus::<(i32, i32)>::new();
///
/// let f = bus.subscribe("load", Listener::new(|(a, b): &(i32, i32)| {
///     println!("f got {a} {b}");
///     Ok(())
/// }));
/// bus.subscribe("load", Listener::new(|_: &(i32, i32)| Ok(())));
///
/// assert_eq!(bus.publish("load", (1, 2))?, 2);
/// assert!(bus.unsubscribe(&f));
/// assert_eq!(bus.publish("load", (1, 2))?, 1);
///
/// // ready events fire once and replay to late subscribers
/// bus.publish_ready("init", (0, 0))?;
/// assert_eq!(bus.publish_ready("init", (9, 9))?, 0);
/// bus.subscribe_ready("init", Listener::new(|args: &(i32, i32)| {
///     assert_eq!(*args, (0, 0));
///     Ok(())
/// }))?;
/// # Ok::<(), readybus::Error>(())
/// ```
///
/// # Delivery
///
/// A publish takes a snapshot of the event's listeners under the bus lock,
/// releases the lock, then calls the listeners one by one. Listeners may
/// therefore call back into the bus:
///
/// - a listener subscribed during a round runs from the next publish on;
/// - a listener unsubscribed during a round is skipped if the round has not
///   reached it yet;
/// - nested publishes run to completion before the outer round continues.
///
/// What happens when a listener fails is set by
/// [`FailurePolicy`](crate::FailurePolicy).
///
/// # Sharing
///
/// `EventBus` is `Send + Sync` and cheap to clone; clones share the same
/// stores. A listener that stores a clone of its own bus keeps the bus alive
/// through a reference cycle until the listener is removed. Capture a
/// [`WeakEventBus`] from [`downgrade`](Self::downgrade) instead.
pub struct EventBus<A: Payload> {
    shared: Arc<Shared<A>>,
}

impl<A: Payload> EventBus<A> {
    /// Create a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new(config.initial_listener_capacity())),
                config,
                #[cfg(feature = "monitoring")]
                monitoring: MonitorRegistry::new(),
            }),
        }
    }

    // Listeners never run under this lock.
    fn registry(&self) -> MutexGuard<'_, Registry<A>> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish an event to every listener currently subscribed to `name`.
    ///
    /// Listeners run synchronously, in registration order, before this call
    /// returns. Returns the number of listeners subscribed when the call
    /// started, or `0` if nobody listens to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if a listener fails, see [`FailurePolicy`].
    pub fn publish(&self, name: impl Into<EventName>, args: A) -> Result<usize> {
        let name = name.into();
        let snapshot = self.registry().snapshot(name.as_str());
        self.deliver(&name, &args, snapshot)
    }

    /// Publish a ready event.
    ///
    /// The first call for a name stores `args` and publishes them like
    /// [`publish`](Self::publish). Every later call for the same name is a
    /// no-op returning `0`: current listeners are not notified again and the
    /// stored payload is kept, until [`purge_ready_events`](Self::purge_ready_events).
    ///
    /// # Errors
    ///
    /// Returns an error if a listener fails, see [`FailurePolicy`]. The event
    /// counts as fired even then.
    pub fn publish_ready(&self, name: impl Into<EventName>, args: A) -> Result<usize> {
        let name = name.into();
        let snapshot = {
            let mut registry = self.registry();
            if registry.latch(name.clone(), args.clone()) {
                Some(registry.snapshot(name.as_str()))
            } else {
                None
            }
        };

        let Some(snapshot) = snapshot else {
            trace!(event = %name, "ready event already fired, ignoring");
            #[cfg(feature = "monitoring")]
            self.shared.monitoring.notify(|m| m.on_ready_ignored(&name));
            return Ok(0);
        };

        debug!(event = %name, listeners = snapshot.len(), "ready event latched");
        #[cfg(feature = "monitoring")]
        self.shared.monitoring.notify(|m| m.on_latched(&name, &args));

        self.deliver(&name, &args, snapshot)
    }

    /// Subscribe `listener` to `name`.
    ///
    /// The listener is appended after the ones already registered. Nothing is
    /// deduplicated: subscribing the same listener twice makes it run twice
    /// per publish.
    pub fn subscribe(&self, name: impl Into<EventName>, listener: Listener<A>) -> Subscription<A> {
        let name = name.into();
        self.registry().subscribe(name.clone(), listener.clone());

        trace!(event = %name, "listener subscribed");
        #[cfg(feature = "monitoring")]
        self.shared.monitoring.notify(|m| m.on_subscribed(&name));

        Subscription::new(name, listener)
    }

    /// Subscribe `listener` to the ready event `name`.
    ///
    /// If the event already fired, the listener is called right away with
    /// the stored payload and is *not* registered. Otherwise this behaves
    /// like [`subscribe`](Self::subscribe) and the listener runs when the
    /// event fires.
    ///
    /// The returned handle is valid in both cases. For an immediately served
    /// listener, [`unsubscribe`](Self::unsubscribe) returns `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the immediate delivery fails, see [`FailurePolicy`].
    pub fn subscribe_ready(
        &self,
        name: impl Into<EventName>,
        listener: Listener<A>,
    ) -> Result<Subscription<A>> {
        let name = name.into();
        let latched = {
            let mut registry = self.registry();
            let latched = registry.latched(name.as_str()).cloned();
            if latched.is_none() {
                registry.subscribe(name.clone(), listener.clone());
            }
            latched
        };

        let subscription = Subscription::new(name, listener);
        match latched {
            None => {
                trace!(event = %subscription.name(), "listener waiting for ready event");
                #[cfg(feature = "monitoring")]
                self.shared
                    .monitoring
                    .notify(|m| m.on_subscribed(subscription.name()));
            }
            Some(args) => {
                debug!(event = %subscription.name(), "replaying ready event");
                #[cfg(feature = "monitoring")]
                self.shared
                    .monitoring
                    .notify(|m| m.on_replayed(subscription.name(), &args));

                let entry = Arc::new(ListenerEntry::new(subscription.listener().clone()));
                self.dispatch(subscription.name(), &args, &[entry])?;
            }
        }
        Ok(subscription)
    }

    /// Remove the listener identified by `subscription`.
    ///
    /// Removes the first registration of that listener under the
    /// subscription's name and returns `true`, or returns `false` if there is
    /// none. Later duplicate registrations stay in place.
    pub fn unsubscribe(&self, subscription: &Subscription<A>) -> bool {
        let removed = self
            .registry()
            .unsubscribe(subscription.name().as_str(), subscription.listener());

        if removed {
            trace!(event = %subscription.name(), "listener unsubscribed");
            #[cfg(feature = "monitoring")]
            self.shared
                .monitoring
                .notify(|m| m.on_unsubscribed(subscription.name()));
        }
        removed
    }

    /// Forget every ready event that has fired.
    ///
    /// The next [`publish_ready`](Self::publish_ready) for any name fires
    /// again. Subscriptions are untouched.
    pub fn purge_ready_events(&self) {
        let cleared = self.registry().clear_latched();
        debug!(cleared, "ready events purged");
        #[cfg(feature = "monitoring")]
        self.shared.monitoring.notify(|m| m.on_purged(Store::Ready));
    }

    /// Drop every subscription on every event.
    ///
    /// Ready events that already fired stay latched, so
    /// [`subscribe_ready`](Self::subscribe_ready) still delivers them.
    pub fn purge_subscriptions(&self) {
        let dropped = self.registry().clear_subscriptions();
        debug!(dropped, "subscriptions purged");
        #[cfg(feature = "monitoring")]
        self.shared
            .monitoring
            .notify(|m| m.on_purged(Store::Subscriptions));
    }

    /// Returns `true` if the ready event `name` has fired and not been purged.
    pub fn is_ready(&self, name: &str) -> bool {
        self.registry().latched(name).is_some()
    }

    /// Returns a copy of the payload stored for the ready event `name`.
    pub fn ready_payload(&self, name: &str) -> Option<A> {
        self.registry().latched(name).cloned()
    }

    /// Number of listeners subscribed to `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry().listener_count(name)
    }

    /// Names present in either store, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry().event_names()
    }

    pub fn config(&self) -> &BusConfig {
        &self.shared.config
    }

    #[cfg(feature = "monitoring")]
    #[cfg_attr(docsrs, doc(cfg(feature = "monitoring")))]
    pub fn monitors(&self) -> &MonitorRegistry<A> {
        &self.shared.monitoring
    }

    /// Create a non-owning handle to this bus.
    pub fn downgrade(&self) -> WeakEventBus<A> {
        WeakEventBus {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn deliver(&self, name: &EventName, args: &A, snapshot: Snapshot<A>) -> Result<usize> {
        let listeners = snapshot.len();
        #[cfg(feature = "monitoring")]
        self.shared
            .monitoring
            .notify(|m| m.on_published(name, args, listeners));

        if snapshot.is_empty() {
            trace!(event = %name, "no listeners");
            return Ok(0);
        }

        trace!(event = %name, listeners, "publishing event");
        self.dispatch(name, args, &snapshot)?;
        Ok(listeners)
    }

    fn dispatch(&self, name: &EventName, args: &A, entries: &[Arc<ListenerEntry<A>>]) -> Result {
        match self.shared.config.failure_policy() {
            FailurePolicy::Propagate => {
                for (position, entry) in entries.iter().enumerate() {
                    if !entry.is_active() {
                        continue;
                    }
                    if let Err(e) = entry.listener().call(args) {
                        self.listener_failed(name, position, &e);
                        return Err(Error::ListenerFailed {
                            event: name.clone(),
                            position,
                            source: Box::new(e),
                        });
                    }
                }
                Ok(())
            }
            FailurePolicy::Continue => {
                let mut failures = Vec::new();
                for (position, entry) in entries.iter().enumerate() {
                    if !entry.is_active() {
                        continue;
                    }
                    let outcome = catch_unwind(AssertUnwindSafe(|| entry.listener().call(args)))
                        .unwrap_or_else(|panic| Err(Error::from_panic(panic)));
                    if let Err(e) = outcome {
                        self.listener_failed(name, position, &e);
                        failures.push(ListenerFailure::new(position, e));
                    }
                }

                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(Error::Delivery {
                        event: name.clone(),
                        delivered: entries.len(),
                        failures,
                    })
                }
            }
        }
    }

    fn listener_failed(&self, name: &EventName, position: usize, error: &Error) {
        warn!(event = %name, position, error = %error, "listener failed");
        #[cfg(feature = "monitoring")]
        self.shared
            .monitoring
            .notify(|m| m.on_listener_failed(name, position, error));
    }
}

impl<A: Payload> Default for EventBus<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Payload> Clone for EventBus<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Payload> fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.shared.config)
            .field("events", &self.event_names())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
impl<A: Payload> EventBus<A> {
    /// Export the current state of both stores as JSON.
    ///
    /// The output is a list with one entry per known event name:
    ///
    /// - `event` - the event name
    /// - `listeners` - number of subscribed listeners
    /// - `ready` - whether the event has fired as a ready event
    ///
    /// Payloads are not included, so `A` does not need to be serializable.
    ///
    /// # Errors
    ///
    /// Returns any serialization error produced by `serde_json`.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn to_json(&self) -> serde_json::Result<String> {
        use serde::Serialize;

        #[derive(Serialize)]
        struct EventExport {
            event: String,
            listeners: usize,
            ready: bool,
        }

        let exports: Vec<EventExport> = {
            let registry = self.registry();
            registry
                .event_names()
                .into_iter()
                .map(|name| EventExport {
                    listeners: registry.listener_count(name.as_str()),
                    ready: registry.latched(name.as_str()).is_some(),
                    event: name.to_string(),
                })
                .collect()
        };

        serde_json::to_string_pretty(&exports)
    }
}

/// Non-owning handle to an [`EventBus`], created by [`EventBus::downgrade`].
///
/// Listeners that publish or subscribe on their own bus should capture a
/// `WeakEventBus` so that the bus can be dropped while they are registered.
pub struct WeakEventBus<A: Payload> {
    shared: Weak<Shared<A>>,
}

impl<A: Payload> WeakEventBus<A> {
    /// Returns the bus if it is still alive.
    pub fn upgrade(&self) -> Option<EventBus<A>> {
        self.shared.upgrade().map(|shared| EventBus { shared })
    }
}

impl<A: Payload> Clone for WeakEventBus<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<A: Payload> fmt::Debug for WeakEventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBus")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::testing::ListenerSpy;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn tagged<A: Payload>(log: &Log, tag: &'static str) -> Listener<A> {
        let log = Arc::clone(log);
        Listener::new(move |_: &A| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    fn failing<A: Payload>(message: &'static str) -> Listener<A> {
        Listener::new(move |_: &A| Err(Error::listener(message)))
    }

    fn continuing<A: Payload>() -> EventBus<A> {
        EventBus::with_config(BusConfig::default().with_failure_policy(FailurePolicy::Continue))
    }

    #[test]
    fn publish_without_listeners_returns_zero() {
        let bus = EventBus::<u32>::new();
        assert_eq!(bus.publish("nobody", 1).unwrap(), 0);
        assert!(bus.event_names().is_empty());
    }

    #[test]
    fn listener_receives_exact_args_once_per_publish() {
        let bus = EventBus::<(i32, String)>::new();
        let spy = ListenerSpy::new();
        bus.subscribe("greet", spy.listener());

        bus.publish("greet", (1, "hi".into())).unwrap();
        bus.publish("greet", (2, "there".into())).unwrap();

        assert_eq!(spy.calls(), vec![(1, "hi".into()), (2, "there".into())]);
        assert_eq!(spy.call_count(), 2);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let bus = EventBus::<()>::new();
        let log = Log::default();
        bus.subscribe("x", tagged(&log, "first"));
        bus.subscribe("x", tagged(&log, "second"));
        bus.subscribe("x", tagged(&log, "third"));

        assert_eq!(bus.publish("x", ()).unwrap(), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn events_are_independent() {
        let bus = EventBus::<u8>::new();
        let load = ListenerSpy::new();
        let unload = ListenerSpy::new();
        bus.subscribe("load", load.listener());
        bus.subscribe("unload", unload.listener());

        bus.publish("load", 1).unwrap();

        assert!(load.was_called());
        assert!(!unload.was_called());
    }

    #[test]
    fn duplicate_subscription_runs_twice() {
        let bus = EventBus::<u8>::new();
        let spy = ListenerSpy::new();
        bus.subscribe("x", spy.listener());
        bus.subscribe("x", spy.listener());

        assert_eq!(bus.publish("x", 7).unwrap(), 2);
        assert_eq!(spy.calls(), vec![7, 7]);
    }

    #[test]
    fn load_scenario() {
        let bus = EventBus::<(i32, i32)>::new();
        let f = ListenerSpy::new();
        let g = ListenerSpy::new();
        let f_handle = bus.subscribe("load", f.listener());
        bus.subscribe("load", g.listener());

        assert_eq!(bus.publish("load", (1, 2)).unwrap(), 2);
        assert_eq!(f.calls(), vec![(1, 2)]);
        assert_eq!(g.calls(), vec![(1, 2)]);

        assert!(bus.unsubscribe(&f_handle));
        assert_eq!(bus.publish("load", (1, 2)).unwrap(), 1);
        assert_eq!(f.call_count(), 1);
        assert_eq!(g.call_count(), 2);
    }

    #[test]
    fn unsubscribe_twice_is_true_then_false() {
        let bus = EventBus::<()>::new();
        let spy = ListenerSpy::new();
        let handle = bus.subscribe("x", spy.listener());

        assert!(bus.unsubscribe(&handle));
        assert!(!bus.unsubscribe(&handle));
        assert_eq!(bus.publish("x", ()).unwrap(), 0);
        assert!(!spy.was_called());
    }

    #[test]
    fn unsubscribe_removes_only_first_duplicate() {
        let bus = EventBus::<()>::new();
        let log = Log::default();
        let shared = tagged(&log, "dup");
        let handle = bus.subscribe("x", shared.clone());
        bus.subscribe("x", tagged(&log, "other"));
        bus.subscribe("x", shared);

        assert!(bus.unsubscribe(&handle));
        assert_eq!(bus.listener_count("x"), 2);
        bus.publish("x", ()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["other", "dup"]);
    }

    #[test]
    fn unsubscribe_unknown_event_is_false() {
        let bus = EventBus::<()>::new();
        let handle = Subscription::new("never".into(), Listener::new(|_: &()| Ok(())));
        assert!(!bus.unsubscribe(&handle));
    }

    #[test]
    fn unsubscribe_with_handle_for_other_listener_is_false() {
        let bus = EventBus::<()>::new();
        bus.subscribe("x", Listener::new(|_: &()| Ok(())));
        let stranger = Subscription::new("x".into(), Listener::new(|_: &()| Ok(())));
        assert!(!bus.unsubscribe(&stranger));
        assert_eq!(bus.listener_count("x"), 1);
    }

    #[test]
    fn publish_ready_fires_once() {
        let bus = EventBus::<(i32, i32)>::new();
        let spy = ListenerSpy::new();
        bus.subscribe("x", spy.listener());

        assert_eq!(bus.publish_ready("x", (1, 2)).unwrap(), 1);
        assert_eq!(bus.publish_ready("x", (9, 9)).unwrap(), 0);

        assert_eq!(spy.calls(), vec![(1, 2)]);
        assert_eq!(bus.ready_payload("x"), Some((1, 2)));
    }

    #[test]
    fn publish_ready_latches_without_listeners() {
        let bus = EventBus::<u8>::new();
        assert_eq!(bus.publish_ready("x", 3).unwrap(), 0);
        assert!(bus.is_ready("x"));
        assert!(!bus.is_ready("y"));
    }

    #[test]
    fn late_ready_subscriber_is_served_immediately() {
        let bus = EventBus::<(i32, i32)>::new();
        bus.publish_ready("x", (1, 2)).unwrap();

        let spy = ListenerSpy::new();
        let handle = bus.subscribe_ready("x", spy.listener()).unwrap();
        assert_eq!(spy.calls(), vec![(1, 2)]);

        // not registered, so plain publishes do not reach it
        assert_eq!(bus.listener_count("x"), 0);
        assert_eq!(bus.publish("x", (5, 5)).unwrap(), 0);
        assert_eq!(spy.call_count(), 1);
        assert!(!bus.unsubscribe(&handle));
    }

    #[test]
    fn early_ready_subscriber_waits_for_the_event() {
        let bus = EventBus::<u8>::new();
        let spy = ListenerSpy::new();
        let handle = bus.subscribe_ready("x", spy.listener()).unwrap();
        assert!(!spy.was_called());

        bus.publish_ready("x", 4).unwrap();
        bus.publish_ready("x", 5).unwrap();
        assert_eq!(spy.calls(), vec![4]);
        assert!(bus.unsubscribe(&handle));
    }

    #[test]
    fn purge_subscriptions_drops_listeners_keeps_ready() {
        let bus = EventBus::<u8>::new();
        let spy = ListenerSpy::new();
        bus.subscribe("x", spy.listener());
        bus.publish_ready("r", 1).unwrap();

        bus.purge_subscriptions();

        assert_eq!(bus.publish("x", 0).unwrap(), 0);
        assert!(!spy.was_called());

        let late = ListenerSpy::new();
        bus.subscribe_ready("r", late.listener()).unwrap();
        assert_eq!(late.calls(), vec![1]);
    }

    #[test]
    fn purge_ready_events_lets_events_fire_again() {
        let bus = EventBus::<u8>::new();
        let waiting = ListenerSpy::new();
        bus.subscribe("x", waiting.listener());
        bus.publish_ready("x", 1).unwrap();

        bus.purge_ready_events();
        assert!(!bus.is_ready("x"));
        assert_eq!(bus.listener_count("x"), 1);

        assert_eq!(bus.publish_ready("x", 5).unwrap(), 1);
        assert_eq!(waiting.calls(), vec![1, 5]);

        let fresh = ListenerSpy::new();
        bus.subscribe_ready("x", fresh.listener()).unwrap();
        assert_eq!(fresh.calls(), vec![5]);
    }

    #[test]
    fn listener_added_mid_round_runs_next_round() {
        let bus = EventBus::<()>::new();
        let late = ListenerSpy::new();
        let weak = bus.downgrade();
        let late_listener = late.listener();
        let added = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&added);
        bus.subscribe(
            "x",
            Listener::new(move |_: &()| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    if let Some(bus) = weak.upgrade() {
                        bus.subscribe("x", late_listener.clone());
                    }
                }
                Ok(())
            }),
        );

        assert_eq!(bus.publish("x", ()).unwrap(), 1);
        assert!(!late.was_called());

        assert_eq!(bus.publish("x", ()).unwrap(), 2);
        assert_eq!(late.call_count(), 1);
    }

    #[test]
    fn listener_removed_mid_round_is_skipped() {
        let bus = EventBus::<()>::new();
        let victim = ListenerSpy::new();
        let weak = bus.downgrade();
        let handle = Subscription::new("x".into(), victim.listener());

        bus.subscribe(
            "x",
            Listener::new(move |_: &()| {
                if let Some(bus) = weak.upgrade() {
                    bus.unsubscribe(&handle);
                }
                Ok(())
            }),
        );
        bus.subscribe("x", victim.listener());

        // the round still reports the listeners it started with
        assert_eq!(bus.publish("x", ()).unwrap(), 2);
        assert!(!victim.was_called());
        assert_eq!(bus.listener_count("x"), 1);
    }

    #[test]
    fn purge_mid_round_skips_remaining_listeners() {
        let bus = EventBus::<()>::new();
        let weak = bus.downgrade();
        let after = ListenerSpy::new();
        bus.subscribe(
            "x",
            Listener::new(move |_: &()| {
                if let Some(bus) = weak.upgrade() {
                    bus.purge_subscriptions();
                }
                Ok(())
            }),
        );
        bus.subscribe("x", after.listener());

        assert_eq!(bus.publish("x", ()).unwrap(), 2);
        assert!(!after.was_called());
    }

    #[test]
    fn nested_publish_completes_before_outer_round_continues() {
        let bus = EventBus::<&'static str>::new();
        let log = Log::default();
        let weak = bus.downgrade();
        let outer_log = Arc::clone(&log);
        bus.subscribe(
            "outer",
            Listener::new(move |_: &&'static str| {
                outer_log.lock().unwrap().push("outer-1");
                if let Some(bus) = weak.upgrade() {
                    bus.publish("inner", "nested")?;
                }
                Ok(())
            }),
        );
        bus.subscribe("outer", tagged(&log, "outer-2"));
        bus.subscribe("inner", tagged(&log, "inner"));

        bus.publish("outer", "go").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["outer-1", "inner", "outer-2"]);
    }

    #[test]
    fn ready_listener_can_subscribe_ready_reentrantly() {
        let bus = EventBus::<u8>::new();
        let weak = bus.downgrade();
        let inner = ListenerSpy::new();
        let inner_listener = inner.listener();
        bus.subscribe_ready(
            "boot",
            Listener::new(move |_: &u8| {
                if let Some(bus) = weak.upgrade() {
                    bus.subscribe_ready("boot", inner_listener.clone())?;
                }
                Ok(())
            }),
        )
        .unwrap();

        bus.publish_ready("boot", 1).unwrap();
        // latched before delivery, so the nested subscribe_ready is served at once
        assert_eq!(inner.calls(), vec![1]);
    }

    #[test]
    fn propagate_aborts_round_on_first_failure() {
        let bus = EventBus::<()>::new();
        let before = ListenerSpy::new();
        let after = ListenerSpy::new();
        bus.subscribe("x", before.listener());
        bus.subscribe("x", failing("boom"));
        bus.subscribe("x", after.listener());

        let err = bus.publish("x", ()).unwrap_err();
        assert_eq!(
            err,
            Error::ListenerFailed {
                event: "x".into(),
                position: 1,
                source: Box::new(Error::listener("boom")),
            }
        );
        assert!(before.was_called());
        assert!(!after.was_called());
    }

    #[test]
    fn propagate_lets_panics_unwind() {
        let bus = EventBus::<()>::new();
        bus.subscribe("x", Listener::new(|_: &()| panic!("listener bug")));

        let result = catch_unwind(AssertUnwindSafe(|| bus.publish("x", ())));
        assert!(result.is_err());

        // the lock is not held while listeners run, so the bus stays usable
        let spy = ListenerSpy::new();
        bus.subscribe("y", spy.listener());
        assert_eq!(bus.publish("y", ()).unwrap(), 1);
    }

    #[test]
    fn continue_runs_every_listener_and_collects_failures() {
        let bus = continuing::<u8>();
        let first = ListenerSpy::new();
        let last = ListenerSpy::new();
        bus.subscribe("x", first.listener());
        bus.subscribe("x", failing("bad"));
        bus.subscribe("x", Listener::new(|_: &u8| panic!("worse")));
        bus.subscribe("x", last.listener());

        let err = bus.publish("x", 1).unwrap_err();
        match &err {
            Error::Delivery {
                event,
                delivered,
                failures,
            } => {
                assert_eq!(event.as_str(), "x");
                assert_eq!(*delivered, 4);
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].position(), 1);
                assert_eq!(failures[0].error(), &Error::listener("bad"));
                assert_eq!(failures[1].position(), 2);
                assert_eq!(failures[1].error(), &Error::Panicked("worse".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(first.was_called());
        assert!(last.was_called());
    }

    #[test]
    fn continue_without_failures_returns_count() {
        let bus = continuing::<u8>();
        bus.subscribe("x", ListenerSpy::new().listener());
        bus.subscribe("x", ListenerSpy::new().listener());
        assert_eq!(bus.publish("x", 1).unwrap(), 2);
    }

    #[test]
    fn failed_ready_round_still_latches() {
        let bus = EventBus::<u8>::new();
        bus.subscribe("x", failing("nope"));

        assert!(bus.publish_ready("x", 1).is_err());
        assert!(bus.is_ready("x"));
        assert_eq!(bus.publish_ready("x", 2).unwrap(), 0);
    }

    #[test]
    fn immediate_ready_delivery_reports_failure() {
        let bus = EventBus::<u8>::new();
        bus.publish_ready("x", 1).unwrap();

        let err = bus.subscribe_ready("x", failing("late")).unwrap_err();
        assert_eq!(err.event(), Some(&EventName::new("x")));
        assert_eq!(err.failures()[0].position(), 0);

        let bus = continuing::<u8>();
        bus.publish_ready("x", 1).unwrap();
        let err = bus
            .subscribe_ready("x", Listener::new(|_: &u8| panic!("late panic")))
            .unwrap_err();
        assert!(matches!(err, Error::Delivery { delivered: 1, .. }));
    }

    #[test]
    fn clones_share_state_and_weak_handles_expire() {
        let bus = EventBus::<u8>::new();
        let clone = bus.clone();
        let spy = ListenerSpy::new();
        clone.subscribe("x", spy.listener());
        assert_eq!(bus.publish("x", 1).unwrap(), 1);

        let weak = bus.downgrade();
        assert!(weak.upgrade().is_some());
        drop(bus);
        drop(clone);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn concurrent_publishers_reach_every_listener() {
        let bus = EventBus::<usize>::new();
        let total = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let total = Arc::clone(&total);
            bus.subscribe(
                "add",
                Listener::new(move |n: &usize| {
                    total.fetch_add(*n, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        bus.publish("add", 1).unwrap();
                    }
                });
            }
        });

        assert_eq!(total.load(Ordering::SeqCst), 8 * 100 * 4);
    }

    #[test]
    fn concurrent_publish_ready_fires_once() {
        let bus = EventBus::<usize>::new();
        let spy = ListenerSpy::new();
        bus.subscribe("ready", spy.listener());

        let fired: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let bus = &bus;
                    s.spawn(move || bus.publish_ready("ready", i).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(fired, 1);
        assert_eq!(spy.call_count(), 1);
        assert_eq!(bus.ready_payload("ready"), spy.last());
    }

    #[test]
    fn event_names_and_counts() {
        let bus = EventBus::<()>::new();
        bus.subscribe("b", Listener::new(|_: &()| Ok(())));
        bus.subscribe("b", Listener::new(|_: &()| Ok(())));
        bus.publish_ready("a", ()).unwrap();

        assert_eq!(
            bus.event_names(),
            vec![EventName::new("a"), EventName::new("b")]
        );
        assert_eq!(bus.listener_count("b"), 2);
        assert_eq!(bus.listener_count("a"), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn to_json_lists_both_stores() {
        let bus = EventBus::<u8>::new();
        bus.subscribe("load", Listener::new(|_: &u8| Ok(())));
        bus.publish_ready("init", 1).unwrap();

        let json = bus.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                { "event": "init", "listeners": 0, "ready": true },
                { "event": "load", "listeners": 1, "ready": false },
            ])
        );
    }

    #[cfg(feature = "monitoring")]
    mod monitoring {
        use super::*;
        use crate::monitoring::{Monitor, Store};

        #[derive(Clone, Default)]
        struct Journal(Arc<Mutex<Vec<String>>>);

        impl Journal {
            fn entries(&self) -> Vec<String> {
                self.0.lock().unwrap().clone()
            }

            fn push(&self, entry: String) {
                self.0.lock().unwrap().push(entry);
            }
        }

        impl Monitor<u8> for Journal {
            fn on_subscribed(&self, event: &EventName) {
                self.push(format!("subscribed {event}"));
            }

            fn on_unsubscribed(&self, event: &EventName) {
                self.push(format!("unsubscribed {event}"));
            }

            fn on_published(&self, event: &EventName, args: &u8, listeners: usize) {
                self.push(format!("published {event} {args} to {listeners}"));
            }

            fn on_latched(&self, event: &EventName, args: &u8) {
                self.push(format!("latched {event} {args}"));
            }

            fn on_ready_ignored(&self, event: &EventName) {
                self.push(format!("ignored {event}"));
            }

            fn on_replayed(&self, event: &EventName, args: &u8) {
                self.push(format!("replayed {event} {args}"));
            }

            fn on_listener_failed(&self, event: &EventName, position: usize, error: &Error) {
                self.push(format!("failed {event} #{position}: {error}"));
            }

            fn on_purged(&self, store: Store) {
                self.push(format!("purged {store}"));
            }
        }

        #[test]
        fn monitor_sees_bus_lifecycle() {
            let bus = EventBus::<u8>::new();
            let journal = Journal::default();
            bus.monitors().add(journal.clone());

            let handle = bus.subscribe("x", Listener::new(|_: &u8| Ok(())));
            bus.subscribe("x", failing("oops"));
            let _ = bus.publish("x", 1);
            bus.unsubscribe(&handle);
            bus.publish_ready("r", 2).unwrap();
            bus.publish_ready("r", 3).unwrap();
            bus.subscribe_ready("r", Listener::new(|_: &u8| Ok(()))).unwrap();
            bus.purge_ready_events();
            bus.purge_subscriptions();

            assert_eq!(
                journal.entries(),
                vec![
                    "subscribed x",
                    "subscribed x",
                    "published x 1 to 2",
                    "failed x #1: oops",
                    "unsubscribed x",
                    "latched r 2",
                    "published r 2 to 0",
                    "ignored r",
                    "replayed r 2",
                    "purged ready",
                    "purged subscriptions",
                ]
            );
        }

        #[test]
        fn removed_monitor_stops_observing() {
            let bus = EventBus::<u8>::new();
            let journal = Journal::default();
            let handle = bus.monitors().add(journal.clone());

            bus.publish("x", 1).unwrap();
            handle.remove();
            bus.publish("x", 2).unwrap();

            assert_eq!(journal.entries(), vec!["published x 1 to 0"]);
            assert!(bus.monitors().is_empty());
        }

        #[test]
        fn paused_monitor_misses_events() {
            let bus = EventBus::<u8>::new();
            let journal = Journal::default();
            let handle = bus.monitors().add(journal.clone());

            handle.pause();
            bus.publish("x", 1).unwrap();
            handle.resume();
            bus.publish("x", 2).unwrap();

            assert_eq!(journal.entries(), vec!["published x 2 to 0"]);
        }
    }
}
