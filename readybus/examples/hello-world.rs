use readybus::{EventBus, Listener, Result};

fn main() -> Result {
    // Every event on this bus carries a (String, u32) payload
    let bus = EventBus::<(String, u32)>::new();

    let greeter = bus.subscribe(
        "greet",
        Listener::new(|(name, times): &(String, u32)| {
            for _ in 0..*times {
                println!("Hello, {name}!");
            }
            Ok(())
        }),
    );
    bus.subscribe(
        "greet",
        Listener::new(|(name, _): &(String, u32)| {
            println!("(greeted {name})");
            Ok(())
        }),
    );

    let reached = bus.publish("greet", ("World".into(), 2))?;
    println!("publish reached {reached} listeners");

    // Remove the first listener, the second one keeps listening
    bus.unsubscribe(&greeter);
    let reached = bus.publish("greet", ("again".into(), 1))?;
    println!("publish reached {reached} listeners");

    Ok(())
}
