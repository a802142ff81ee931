use std::fmt;

/// One of the two stores owned by a bus, as reported by
/// [`Monitor::on_purged`](crate::monitoring::Monitor::on_purged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Store {
    /// Transient listeners registered with `subscribe`.
    Subscriptions,
    /// Latched payloads of ready events.
    Ready,
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Store::Subscriptions => write!(f, "subscriptions"),
            Store::Ready => write!(f, "ready"),
        }
    }
}
