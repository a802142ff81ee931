use std::{fmt, sync::Arc};

use crate::{Payload, Result};

type ListenerFn<A> = dyn Fn(&A) -> Result + Send + Sync;

/// A callback invoked with the payload of every event it is subscribed to.
///
/// `Listener` wraps the callback in an `Arc`. Cloning a listener keeps its
/// identity: [`EventBus::unsubscribe`](crate::EventBus::unsubscribe) matches
/// listeners by pointer, never by behavior, so two listeners built from
/// identical closures are still different listeners.
///
/// Subscribing the same listener twice registers it twice, and it runs twice
/// per publish.
///
/// ```rust
/// use readybus::{EventBus, Listener};
///
/// let bus = EventBus::<(i32, i32)>::new();
/// let log = Listener::new(|(x, y): &(i32, i32)| {
///     println!("moved to {x},{y}");
///     Ok(())
/// });
///
/// bus.subscribe("move", log.clone());
/// bus.subscribe("jump", log);
/// assert_eq!(bus.publish("move", (1, 2))?, 1);
/// # Ok::<(), readybus::Error>(())
/// ```
pub struct Listener<A: Payload>(Arc<ListenerFn<A>>);

impl<A: Payload> Listener<A> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the callback with `args`.
    #[inline]
    pub fn call(&self, args: &A) -> Result {
        (self.0)(args)
    }

    /// Returns `true` if both values refer to the same callback.
    #[inline]
    pub fn same_as(&self, other: &Listener<A>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<A: Payload> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<A: Payload> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
