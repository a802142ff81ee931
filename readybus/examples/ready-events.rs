//! Start-up sequencing with ready events.
//!
//! Components announce that they are ready with `publish_ready`. Anything that
//! depends on them uses `subscribe_ready` and runs exactly once, whether it
//! subscribed before or after the announcement.
use readybus::{EventBus, Listener, Result};

#[derive(Clone, Debug)]
enum Startup {
    ConfigLoaded { path: String, entries: usize },
    DatabaseConnected { url: String },
}

fn main() -> Result {
    let bus = EventBus::<Startup>::new();

    // Subscribes early: waits for the event
    bus.subscribe_ready(
        "config",
        Listener::new(|event: &Startup| {
            if let Startup::ConfigLoaded { path, entries } = event {
                println!("[cache] config {path} has {entries} entries, warming up");
            }
            Ok(())
        }),
    )?;

    println!("loading configuration...");
    bus.publish_ready(
        "config",
        Startup::ConfigLoaded {
            path: "app.toml".into(),
            entries: 12,
        },
    )?;

    // A second announcement is ignored, nobody hears about it
    let reached = bus.publish_ready(
        "config",
        Startup::ConfigLoaded {
            path: "other.toml".into(),
            entries: 0,
        },
    )?;
    println!("repeated announcement reached {reached} listeners");

    // Subscribes late: served immediately with the first payload
    bus.subscribe_ready(
        "config",
        Listener::new(|event: &Startup| {
            println!("[http] late subscriber sees {event:?}");
            Ok(())
        }),
    )?;

    bus.subscribe_ready(
        "database",
        Listener::new(|event: &Startup| {
            if let Startup::DatabaseConnected { url } = event {
                println!("[http] database ready at {url}, accepting requests");
            }
            Ok(())
        }),
    )?;
    bus.publish_ready(
        "database",
        Startup::DatabaseConnected {
            url: "postgres://localhost/app".into(),
        },
    )?;

    // Restart: forget what fired, keep subscriptions
    bus.purge_ready_events();
    println!("config ready after purge: {}", bus.is_ready("config"));

    Ok(())
}
