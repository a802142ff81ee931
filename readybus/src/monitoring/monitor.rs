use crate::{Error, EventName, Payload, monitoring::Store};

/// Trait for observing activity on a bus.
///
/// Implement this trait to receive callbacks as events are published and
/// subscriptions change. All methods have default no-op implementations, so
/// you only need to override the ones you care about.
///
/// # Example
///
/// ```rust
/// use readybus::{EventName, Payload};
/// use readybus::monitoring::Monitor;
///
/// struct ReadyLogger;
///
/// impl<A: Payload> Monitor<A> for ReadyLogger {
///     fn on_latched(&self, event: &EventName, _args: &A) {
///         println!("[ready] {event}");
///     }
///
///     fn on_replayed(&self, event: &EventName, _args: &A) {
///         println!("[replay] {event} to a late subscriber");
///     }
/// }
/// ```
///
/// # Callback order
///
/// For `publish_ready` on a name that has not fired yet, `on_latched` fires
/// before `on_published`. Listener failures are reported through
/// `on_listener_failed` as they happen, before the publish returns.
///
/// A monitor that panics is removed from the bus.
pub trait Monitor<A: Payload>: Send + Sync {
    /// Called after a listener was added to the subscriptions store.
    fn on_subscribed(&self, event: &EventName) {
        let _e = event;
    }

    /// Called after a listener was removed by `unsubscribe`.
    fn on_unsubscribed(&self, event: &EventName) {
        let _e = event;
    }

    /// Called when a publish round starts.
    ///
    /// `listeners` is the size of the snapshot the round will walk, which is
    /// also what the publish returns on success.
    fn on_published(&self, event: &EventName, args: &A, listeners: usize) {
        let _e = event;
        let _a = args;
        let _l = listeners;
    }

    /// Called when a ready event fires for the first time and its payload
    /// is stored.
    fn on_latched(&self, event: &EventName, args: &A) {
        let _e = event;
        let _a = args;
    }

    /// Called when `publish_ready` is ignored because the event already fired.
    fn on_ready_ignored(&self, event: &EventName) {
        let _e = event;
    }

    /// Called when `subscribe_ready` delivers a latched payload immediately.
    fn on_replayed(&self, event: &EventName, args: &A) {
        let _e = event;
        let _a = args;
    }

    /// Called when a listener returns an error or, under
    /// [`FailurePolicy::Continue`](crate::FailurePolicy::Continue), panics.
    fn on_listener_failed(&self, event: &EventName, position: usize, error: &Error) {
        let _e = event;
        let _p = position;
        let _r = error;
    }

    /// Called after a store was cleared.
    fn on_purged(&self, store: Store) {
        let _s = store;
    }
}
