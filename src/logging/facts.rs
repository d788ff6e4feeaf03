use std::io::Write;
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

/// Failure reported by an event sink. The engine logs and discards it.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Receiver of structured progress events (`file.operation`, `file.rollback`, ...).
pub trait EventSink {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Any error is swallowed by the engine; it never fails a file operation.
    fn emit(&self, event: &str, payload: Value) -> Result<(), SinkError>;
}

pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &str, payload: Value) -> Result<(), SinkError> {
        (**self).emit(event, payload)
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn log(&self, level: Level, msg: &str) {
        (**self).log(level, msg);
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &str, _payload: Value) -> Result<(), SinkError> {
        Ok(())
    }
}

impl AuditSink for NullSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Forwards audit lines to the `log` facade under the `patchbay` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAudit;

impl AuditSink for LogAudit {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "patchbay", level, "{msg}");
    }
}

/// Writes one JSON object per line: `{"event": <name>, ...payload}`.
#[derive(Debug)]
pub struct JsonlSink<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer, e.g. to inspect a `Vec<u8>` buffer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> EventSink for JsonlSink<W> {
    fn emit(&self, event: &str, payload: Value) -> Result<(), SinkError> {
        let mut line = serde_json::Map::new();
        line.insert("event".into(), Value::String(event.to_string()));
        if let Value::Object(obj) = payload {
            line.extend(obj);
        } else {
            line.insert("payload".into(), payload);
        }
        let encoded = serde_json::to_string(&Value::Object(line))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Unavailable("writer lock poisoned".into()))?;
        writeln!(out, "{encoded}")?;
        Ok(())
    }
}

/// Collects events in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn named(&self, event: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|(name, _)| name == event)
            .map(|(_, v)| v)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &str, payload: Value) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|_| SinkError::Unavailable("event buffer poisoned".into()))?
            .push((event.to_string(), payload));
        Ok(())
    }
}
