use std::fmt;

/// Controls what happens when a listener fails during a publish round.
///
/// A listener fails by returning `Err` or by panicking. The policy is part
/// of [`BusConfig`](crate::BusConfig) and applies to every publish on the bus,
/// including the immediate delivery performed by
/// [`EventBus::subscribe_ready`](crate::EventBus::subscribe_ready).
///
/// | Policy | On failure | Panics | Error returned |
/// |--------|------------|--------|----------------|
/// | [`Propagate`](Self::Propagate) | Abort the round | Unwind out of `publish` | [`Error::ListenerFailed`](crate::Error::ListenerFailed) |
/// | [`Continue`](Self::Continue) | Keep delivering | Caught and collected | [`Error::Delivery`](crate::Error::Delivery) |
///
/// # Default
///
/// The default is `Propagate`: one failing listener stops delivery to the
/// listeners registered after it. Choose `Continue` when one bad listener
/// must not starve the others.
///
/// ```rust
/// use readybus::{BusConfig, EventBus, FailurePolicy};
///
/// let bus = EventBus::<()>::with_config(
///     BusConfig::default().with_failure_policy(FailurePolicy::Continue),
/// );
/// # let _ = bus;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Stop at the first listener that returns `Err` and return that error.
    ///
    /// Listeners after the failing one do not run in this round. A panicking
    /// listener unwinds through `publish` to the caller.
    #[default]
    Propagate,

    /// Run every listener of the round, then report all failures at once.
    ///
    /// Panics are caught with `catch_unwind` and reported as
    /// [`Error::Panicked`](crate::Error::Panicked). The round still counts
    /// every listener in the returned error.
    Continue,
}

impl FailurePolicy {
    /// Returns `true` if this is the [`Propagate`](Self::Propagate) policy.
    pub fn is_propagate(&self) -> bool {
        matches!(self, FailurePolicy::Propagate)
    }

    /// Returns `true` if this is the [`Continue`](Self::Continue) policy.
    pub fn is_continue(&self) -> bool {
        matches!(self, FailurePolicy::Continue)
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Propagate => write!(f, "Propagate"),
            FailurePolicy::Continue => write!(f, "Continue"),
        }
    }
}
