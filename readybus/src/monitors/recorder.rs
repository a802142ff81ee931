use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use serde::Serialize;

use crate::{EventName, Payload, monitoring::Monitor};

/// A monitor that records publications to a file in JSON Lines format.
///
/// Each publish round and each replay to a late ready subscriber is written
/// as a JSON object on its own line, making the output easy to parse and
/// stream. Lines are flushed immediately for reliability (not optimized for
/// high-throughput).
///
/// ```json
/// {"kind":"ready","event":"init","args":[1,2],"listeners":3,"timestamp":1718000000000000000}
/// ```
///
/// # Example
///
/// ```ignore
/// let recorder = Recorder::new("events.jsonl")?;
/// bus.monitors().add(recorder);
/// ```
#[derive(Debug)]
pub struct Recorder {
    writer: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum RecordKind {
    Publish,
    Ready,
    Replay,
}

#[derive(Serialize)]
struct Record<'a, A> {
    kind: RecordKind,
    event: &'a EventName,
    args: &'a A,
    #[serde(skip_serializing_if = "Option::is_none")]
    listeners: Option<usize>,
    timestamp: u64,
}

impl Recorder {
    /// Create a new recorder that writes to the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write<A: Serialize>(&self, record: &Record<'_, A>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = serde_json::to_writer(&mut *writer, record) {
            tracing::warn!("Recorder failed to serialize event: {}", e);
            return;
        }
        if let Err(e) = writer.write_all(b"\n").and_then(|_| writer.flush()) {
            tracing::warn!("Recorder failed to write event: {}", e);
        }
    }
}

// A first publish_ready produces a "ready" line followed by a "publish" line.
impl<A> Monitor<A> for Recorder
where
    A: Payload + Serialize,
{
    fn on_published(&self, event: &EventName, args: &A, listeners: usize) {
        self.write(&Record {
            kind: RecordKind::Publish,
            event,
            args,
            listeners: Some(listeners),
            timestamp: now(),
        });
    }

    fn on_latched(&self, event: &EventName, args: &A) {
        self.write(&Record {
            kind: RecordKind::Ready,
            event,
            args,
            listeners: None,
            timestamp: now(),
        });
    }

    fn on_replayed(&self, event: &EventName, args: &A) {
        self.write(&Record {
            kind: RecordKind::Replay,
            event,
            args,
            listeners: None,
            timestamp: now(),
        });
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
