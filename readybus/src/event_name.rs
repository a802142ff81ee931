use std::{borrow::Borrow, fmt, hash::Hash, sync::Arc};

/// Name of an event, the key under which listeners and ready payloads are stored.
///
/// Names are opaque: no validation, no hierarchy, no wildcards. Two names
/// are equal when their strings are equal. `EventName` is cheap to clone
/// and can be looked up by `&str` in maps keyed by it.
///
/// Every bus operation that takes a name accepts anything that converts
/// into `EventName`, so plain string literals work:
///
/// ```rust
/// use readybus::{EventBus, EventName};
///
/// let bus = EventBus::<u32>::new();
/// bus.publish("tick", 1)?;
/// bus.publish(EventName::new("tick"), 2)?;
/// # Ok::<(), readybus::Error>(())
/// ```
#[derive(Debug, Clone, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventName(Arc<str>);

impl EventName {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the string representation of this name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for EventName {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for EventName {}

impl Hash for EventName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EventName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}
