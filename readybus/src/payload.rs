/// Marker trait for the argument payload carried by events on a bus.
///
/// An [`EventBus<A>`](crate::EventBus) delivers values of exactly one payload
/// type `A`, which fixes the argument shape of every event at compile time.
/// Tuples work well for positional arguments, enums when different events
/// need different shapes:
///
/// ```rust
/// use readybus::EventBus;
///
/// // every event carries two integers
/// let positions = EventBus::<(i32, i32)>::new();
///
/// // events with different shapes share one bus through an enum
/// #[derive(Clone, Debug)]
/// enum AppEvent {
///     Loaded { items: usize },
///     Failed(String),
/// }
/// let app = EventBus::<AppEvent>::new();
/// # let _ = (positions, app);
/// ```
///
/// Payloads must be `Clone + Send + Sync + 'static` because ready events keep
/// a copy of their payload for late subscribers, and because the bus can be
/// shared across threads. The trait is implemented for every such type.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}
