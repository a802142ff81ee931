use readybus::{EventBus, Listener, monitors::Recorder};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
enum Reading {
    Temperature(f64),
    Humidity(f64),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("readybus-readings.jsonl");

    let bus = EventBus::<Reading>::new();
    bus.monitors().add(Recorder::new(&path)?);

    bus.subscribe(
        "sensor",
        Listener::new(|reading: &Reading| {
            println!("received {reading:?}");
            Ok(())
        }),
    );
    bus.publish("sensor", Reading::Temperature(21.5))?;
    bus.publish("sensor", Reading::Humidity(0.4))?;
    bus.publish_ready("calibrated", Reading::Temperature(0.0))?;

    println!("--- {} ---", path.display());
    print!("{}", std::fs::read_to_string(&path)?);
    Ok(())
}
