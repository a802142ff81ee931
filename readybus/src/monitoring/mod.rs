//! Monitoring API for observing activity on a bus.
//!
//! Enable with the `monitoring` feature:
//!
//! ```toml
//! [dependencies]
//! readybus = { version = "0.1", features = ["monitoring"] }
//! ```
//!
//! # Overview
//!
//! Monitors receive a callback for every change to either store and for
//! every delivery:
//! - subscriptions added and removed
//! - events published, ready events latched, ignored or replayed
//! - listener failures
//! - purges
//!
//! Callbacks run synchronously on the thread that called into the bus,
//! after the bus lock has been released.
//!
//! # Example
//!
//! ```rust
//! use readybus::{EventBus, EventName, Payload};
//! use readybus::monitoring::Monitor;
//!
//! struct PublishLogger;
//!
//! impl<A: Payload> Monitor<A> for PublishLogger {
//!     fn on_published(&self, event: &EventName, _args: &A, listeners: usize) {
//!         println!("[publish] {event} -> {listeners} listeners");
//!     }
//! }
//!
//! let bus = EventBus::<u32>::new();
//! let handle = bus.monitors().add(PublishLogger);
//! bus.publish("tick", 1)?;
//! handle.remove();
//! # Ok::<(), readybus::Error>(())
//! ```

mod dispatcher;
mod monitor;
mod monitor_handle;
mod registry;
mod store;

/// Unique identifier for a registered monitor.
pub type MonitorId = u16;

pub(crate) use dispatcher::MonitorDispatcher;
pub use monitor::Monitor;
pub use monitor_handle::MonitorHandle;
pub use registry::MonitorRegistry;
pub use store::Store;
