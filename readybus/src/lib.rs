#![cfg_attr(docsrs, feature(doc_cfg))]
//! # readybus
//!
//! An in-process publish/subscribe event bus with latched *ready* events.
//!
//! Plain events reach whoever is subscribed at the moment they are published.
//! Ready events fire once: the bus remembers their payload and hands it to
//! every listener that subscribes afterwards. Use them for one-time signals
//! such as "configuration loaded" where late subscribers still need to react.
//!
//! ## Quick Start
//!
//! ```rust
//! use readybus::{EventBus, Listener};
//!
//! let bus = EventBus::<(i32, i32)>::new();
//!
//! let handle = bus.subscribe("load", Listener::new(|(x, y): &(i32, i32)| {
//!     println!("loaded {x}x{y}");
//!     Ok(())
//! }));
//! assert_eq!(bus.publish("load", (640, 480))?, 1);
//! bus.unsubscribe(&handle);
//!
//! bus.publish_ready("init", (1, 2))?;
//! // subscribed after the fact, called immediately with (1, 2)
//! bus.subscribe_ready("init", Listener::new(|args: &(i32, i32)| {
//!     assert_eq!(*args, (1, 2));
//!     Ok(())
//! }))?;
//! # Ok::<(), readybus::Error>(())
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EventBus`] | Owns subscriptions and latched ready events |
//! | [`Listener`] | Callback invoked with an event's payload, matched by identity |
//! | [`Subscription`] | Handle returned by subscribe, accepted by unsubscribe |
//! | [`EventName`] | Key of an event |
//! | [`Payload`] | Marker trait for the argument type carried by a bus |
//! | [`BusConfig`] | Bus configuration |
//! | [`FailurePolicy`] | What a publish does when a listener fails |
//!
//! ## Payloads
//!
//! A bus carries one payload type, so the argument shape of every event is
//! checked at compile time. Use a tuple for positional arguments or an enum
//! when events need different shapes. See [`Payload`].
//!
//! ## Listener Failures
//!
//! Listeners return [`Result`]. By default the first failing listener aborts
//! the round and its error is returned from `publish`. With
//! [`FailurePolicy::Continue`] every listener runs and the failures,
//! including panics, are reported together:
//!
//! ```rust
//! use readybus::{BusConfig, Error, EventBus, FailurePolicy, Listener};
//!
//! let bus = EventBus::<()>::with_config(
//!     BusConfig::default().with_failure_policy(FailurePolicy::Continue),
//! );
//! bus.subscribe("x", Listener::new(|_: &()| Err(Error::listener("broken"))));
//! bus.subscribe("x", Listener::new(|_: &()| Ok(())));
//!
//! let err = bus.publish("x", ()).unwrap_err();
//! assert_eq!(err.failures().len(), 1);
//! ```
//!
//! ## Features
//!
//! - **`monitoring`** - Lifecycle hooks for debugging, metrics, and logging
//! - **`test-harness`** - [`ListenerSpy`](testing::ListenerSpy) for asserting on deliveries
//! - **`serde`** - Serialization of configuration and names, plus `EventBus::to_json()`
//! - **`recorder`** - Built-in `Recorder` monitor for writing publications to JSON Lines files (enables `monitoring` and `serde`)
//!
//! ## Examples
//!
//! See the `examples/` directory:
//!
//! - `hello-world.rs` - Subscribe, publish, unsubscribe
//! - `ready-events.rs` - Application start-up signalled with ready events
//! - `failure-policy.rs` - Propagating versus collecting listener failures
//! - `monitoring.rs` - Observing a bus with monitors and `tracing`
//! - `recorder.rs` - Recording publications to a JSON Lines file

mod bus;
mod bus_config;
mod error;
mod event_name;
mod failure_policy;
mod listener;
mod payload;
mod subscription;

mod internal;

#[cfg(any(test, feature = "test-harness"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-harness")))]
pub mod testing;

#[cfg(feature = "monitoring")]
#[cfg_attr(docsrs, doc(cfg(feature = "monitoring")))]
pub mod monitoring;

#[cfg(feature = "monitoring")]
#[cfg_attr(docsrs, doc(cfg(feature = "monitoring")))]
pub mod monitors;

pub use bus::{EventBus, WeakEventBus};
pub use bus_config::BusConfig;
pub use error::{Error, ListenerFailure};
pub use event_name::EventName;
pub use failure_policy::FailurePolicy;
pub use listener::Listener;
pub use payload::Payload;
pub use subscription::Subscription;

/// Convenience alias for `Result<T, readybus::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
