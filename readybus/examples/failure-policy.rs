use readybus::{BusConfig, Error, EventBus, FailurePolicy, Listener};

fn subscribe_all(bus: &EventBus<u32>) {
    bus.subscribe(
        "order",
        Listener::new(|id: &u32| {
            println!("  audit: order {id}");
            Ok(())
        }),
    );
    bus.subscribe(
        "order",
        Listener::new(|id: &u32| {
            let result: Result<(), std::num::TryFromIntError> = u8::try_from(*id).map(|_| ());
            result.map_err(Error::external)
        }),
    );
    bus.subscribe(
        "order",
        Listener::new(|id: &u32| {
            println!("  billing: order {id}");
            Ok(())
        }),
    );
}

fn main() {
    println!("Propagate (default): the failing listener stops the round");
    let bus = EventBus::new();
    subscribe_all(&bus);
    if let Err(e) = bus.publish("order", 1000) {
        println!("  error: {e}");
    }

    println!("Continue: every listener runs, failures are collected");
    let bus = EventBus::with_config(BusConfig::default().with_failure_policy(FailurePolicy::Continue));
    subscribe_all(&bus);
    if let Err(e) = bus.publish("order", 1000) {
        println!("  error: {e}");
        for failure in e.failures() {
            println!("    {failure}");
        }
    }
}
