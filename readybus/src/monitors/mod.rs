//! Ready-to-use monitor implementations.
//!
//! This module contains concrete [`Monitor`](crate::monitoring::Monitor) implementations
//! for common use cases like event recording and logging.
//!
//! # Available Monitors
//!
//! - [`Tracer`] - Logs bus activity via `tracing` crate
//! - [`EventMonitor`] - Counts publications, failures and ready events per name
//! - [`Recorder`] - Records publications to a JSON Lines file (requires `recorder` feature)
//!
//! # Example
//!
//! ```rust
//! use readybus::EventBus;
//! use readybus::monitors::Tracer;
//!
//! let bus = EventBus::<u32>::new();
//! bus.monitors().add(Tracer);
//! ```

mod tracer;
pub use tracer::Tracer;

mod event_monitor;
pub use event_monitor::EventMonitor;

#[cfg(feature = "recorder")]
mod recorder;

#[cfg(feature = "recorder")]
#[cfg_attr(docsrs, doc(cfg(feature = "recorder")))]
pub use recorder::Recorder;
