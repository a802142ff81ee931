use std::fmt::Debug;

use crate::{
    Error, EventName, Payload,
    monitoring::{Monitor, Store},
};

/// A monitor that logs bus activity to the `tracing` crate.
///
/// Provides visibility into event flow without custom code. Log levels:
/// - `trace` - subscriptions and ignored ready events (high volume)
/// - `debug` - publications, latches and replays
/// - `warn` - listener failures
/// - `info` - purges
///
/// # Example
///
/// ```ignore
/// use readybus::monitors::Tracer;
///
/// bus.monitors().add(Tracer);
/// ```
#[derive(Debug)]
pub struct Tracer;

impl<A> Monitor<A> for Tracer
where
    A: Payload + Debug,
{
    fn on_subscribed(&self, event: &EventName) {
        tracing::trace!(event = %event, "listener subscribed");
    }

    fn on_unsubscribed(&self, event: &EventName) {
        tracing::trace!(event = %event, "listener unsubscribed");
    }

    fn on_published(&self, event: &EventName, args: &A, listeners: usize) {
        tracing::debug!(
            event = %event,
            args = ?args,
            listeners,
            "event published"
        );
    }

    fn on_latched(&self, event: &EventName, args: &A) {
        tracing::debug!(event = %event, args = ?args, "ready event latched");
    }

    fn on_ready_ignored(&self, event: &EventName) {
        tracing::trace!(event = %event, "ready event already fired");
    }

    fn on_replayed(&self, event: &EventName, args: &A) {
        tracing::debug!(event = %event, args = ?args, "ready event replayed");
    }

    fn on_listener_failed(&self, event: &EventName, position: usize, error: &Error) {
        tracing::warn!(
            event = %event,
            position,
            error = %error,
            "listener error"
        );
    }

    fn on_purged(&self, store: Store) {
        tracing::info!(store = %store, "store purged");
    }
}
