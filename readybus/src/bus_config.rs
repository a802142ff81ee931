use crate::FailurePolicy;

/// Configuration for an [`EventBus`](crate::EventBus).
///
/// Use the builder methods to customize, or [`Default`] for the behavior of
/// a plain pub/sub bus: failures propagate to the publisher.
///
/// # Examples
///
/// ```rust
/// use readybus::{BusConfig, FailurePolicy};
///
/// let config = BusConfig::default()
///     .with_failure_policy(FailurePolicy::Continue)  // isolate failing listeners
///     .with_initial_listener_capacity(16);           // busy events
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusConfig {
    /// What a publish does when a listener fails.
    /// Default: [`FailurePolicy::Propagate`]
    failure_policy: FailurePolicy,

    /// Capacity reserved for the listener list of an event the first time
    /// something subscribes to it.
    /// Default: 4
    initial_listener_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            failure_policy: FailurePolicy::Propagate,
            initial_listener_capacity: 4,
        }
    }
}

impl BusConfig {
    /// Set the policy applied when a listener fails.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Returns the policy applied when a listener fails.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Set the capacity reserved for a new event's listener list.
    pub fn with_initial_listener_capacity(mut self, capacity: usize) -> Self {
        self.initial_listener_capacity = capacity;
        self
    }

    /// Returns the capacity reserved for a new event's listener list.
    pub fn initial_listener_capacity(&self) -> usize {
        self.initial_listener_capacity
    }
}
