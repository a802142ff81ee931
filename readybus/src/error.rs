use std::{any::Any, fmt, sync::Arc};

use crate::EventName;

/// The single error type for all readybus operations.
///
/// Looking up an unknown event is never an error: publishing to a name
/// nobody listens to returns `Ok(0)`. Errors only arise from listeners,
/// either because a listener returned `Err` or, under
/// [`FailurePolicy::Continue`](crate::FailurePolicy::Continue), because it
/// panicked.
///
/// Listeners return `readybus::Result`, so they build errors with
/// [`Error::listener`] for a plain message or [`Error::external`] to wrap
/// any foreign error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Listener(String),

    #[error("External error: {0}")]
    External(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("Listener panicked: {0}")]
    Panicked(String),

    /// A listener failed and the round was aborted
    /// ([`FailurePolicy::Propagate`](crate::FailurePolicy::Propagate)).
    #[error("Listener #{position} of '{event}' failed: {source}")]
    ListenerFailed {
        event: EventName,
        position: usize,
        #[source]
        source: Box<Error>,
    },

    /// One or more listeners failed while the round ran to completion
    /// ([`FailurePolicy::Continue`](crate::FailurePolicy::Continue)).
    #[error("{} of {delivered} listeners of '{event}' failed", .failures.len())]
    Delivery {
        event: EventName,
        delivered: usize,
        failures: Vec<ListenerFailure>,
    },
}

impl Error {
    /// Build a listener failure from a message.
    pub fn listener(message: impl Into<String>) -> Self {
        Error::Listener(message.into())
    }

    pub fn external(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::External(Arc::new(e))
    }

    pub(crate) fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Error::Panicked(message)
    }

    /// Name of the event whose delivery failed, if this error came out of a
    /// publish round.
    pub fn event(&self) -> Option<&EventName> {
        match self {
            Error::ListenerFailed { event, .. } | Error::Delivery { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Individual listener failures carried by this error.
    ///
    /// Empty for errors that did not come out of a publish round.
    pub fn failures(&self) -> Vec<ListenerFailure> {
        match self {
            Error::ListenerFailed {
                position, source, ..
            } => vec![ListenerFailure::new(*position, (**source).clone())],
            Error::Delivery { failures, .. } => failures.clone(),
            _ => Vec::new(),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Listener(a), Self::Listener(b)) => a == b,
            (Self::External(a), Self::External(b)) => Arc::ptr_eq(a, b),
            (Self::Panicked(a), Self::Panicked(b)) => a == b,
            (
                Self::ListenerFailed {
                    event: e1,
                    position: p1,
                    source: s1,
                },
                Self::ListenerFailed {
                    event: e2,
                    position: p2,
                    source: s2,
                },
            ) => e1 == e2 && p1 == p2 && s1 == s2,
            (
                Self::Delivery {
                    event: e1,
                    delivered: d1,
                    failures: f1,
                },
                Self::Delivery {
                    event: e2,
                    delivered: d2,
                    failures: f2,
                },
            ) => e1 == e2 && d1 == d2 && f1 == f2,
            _ => false,
        }
    }
}

impl Eq for Error {}

/// A single listener that failed during a publish round.
///
/// `position` is the listener's index in the snapshot taken when the round
/// started, which is its registration order at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    position: usize,
    error: Error,
}

impl ListenerFailure {
    pub(crate) fn new(position: usize, error: Error) -> Self {
        Self { position, error }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn error(&self) -> &Error {
        &self.error
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.position, self.error)
    }
}
