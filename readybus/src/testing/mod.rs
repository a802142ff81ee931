//! Test utilities for asserting on what listeners received.
//!
//! Enable with the `test-harness` feature:
//!
//! ```toml
//! [dev-dependencies]
//! readybus = { version = "0.1", features = ["test-harness"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use readybus::{EventBus, testing::ListenerSpy};
//!
//! let bus = EventBus::<(i32, i32)>::new();
//! let spy = ListenerSpy::new();
//! bus.subscribe("load", spy.listener());
//!
//! bus.publish("load", (1, 2))?;
//! assert_eq!(spy.calls(), vec![(1, 2)]);
//! ```
//!
//! # Warning
//!
//! **Do not use in production.** Spies keep every payload they receive.

mod listener_spy;

pub use listener_spy::ListenerSpy;
