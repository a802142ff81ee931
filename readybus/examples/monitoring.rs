use readybus::{
    Error, EventBus, EventName, Listener, Result,
    monitoring::{Monitor, Store},
    monitors::{EventMonitor, Tracer},
};

// Custom monitor demonstrating the Monitor trait.
// For simple tracing, consider using `readybus::monitors::Tracer` instead.
struct Printer;

impl Monitor<String> for Printer {
    fn on_published(&self, event: &EventName, args: &String, listeners: usize) {
        println!("Event {event} ({args}) published to {listeners} listeners");
    }

    fn on_replayed(&self, event: &EventName, args: &String) {
        println!("Ready event {event} ({args}) replayed to a late subscriber");
    }

    fn on_listener_failed(&self, event: &EventName, position: usize, error: &Error) {
        eprintln!("Listener #{position} of {event} failed: {error}");
    }

    fn on_purged(&self, store: Store) {
        println!("Purged {store}");
    }
}

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let bus = EventBus::<String>::new();
    bus.monitors().add(Printer);
    bus.monitors().add(Tracer);
    let stats = EventMonitor::new();
    bus.monitors().add(stats.clone());

    bus.subscribe(
        "chat",
        Listener::new(|msg: &String| {
            println!("chat: {msg}");
            Ok(())
        }),
    );
    bus.publish("chat", "hello".into())?;
    bus.publish("chat", "world".into())?;

    bus.publish_ready("session", "alice".into())?;
    bus.subscribe_ready(
        "session",
        Listener::new(|user: &String| {
            println!("session started for {user}");
            Ok(())
        }),
    )?;

    bus.purge_subscriptions();

    println!(
        "chat published {} times, session fired: {}, replays: {}",
        stats.publish_count("chat"),
        stats.has_fired("session"),
        stats.replay_count()
    );
    Ok(())
}
