//! Structured event log
//!
//! Every observable step of a polling session is reported as a [`LogRecord`]
//! and handed to a [`LogSink`]. The production sink writes one JSON object
//! per line; tests capture records in memory.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use onvif_api::{xsd, Value};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// One line of the event log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn serialize_timestamp<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&xsd::format_datetime(timestamp))
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(level: Level, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data,
        }
    }

    /// Render the record as a single line of JSON
    ///
    /// A payload that cannot be serialized is replaced by its error so the
    /// record itself is never lost.
    pub fn to_json_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => {
                let fallback = LogRecord {
                    timestamp: self.timestamp,
                    level: self.level,
                    message: self.message.clone(),
                    data: Some(Value::map().with("serialization_error", e.to_string())),
                };
                serde_json::to_string(&fallback).unwrap_or_else(|_| {
                    format!(
                        r#"{{"timestamp":"{}","level":"{}","message":"unserializable record"}}"#,
                        xsd::format_datetime(&self.timestamp),
                        self.level
                    )
                })
            }
        }
    }
}

/// Destination for the event log
///
/// Sinks are shared with the caller, so emission takes `&self`.
pub trait LogSink {
    fn emit(&self, record: LogRecord);

    fn log(&self, level: Level, message: &str, data: Option<Value>) {
        self.emit(LogRecord::new(level, message, data));
    }

    fn debug(&self, message: &str, data: Option<Value>) {
        self.log(Level::Debug, message, data);
    }

    fn info(&self, message: &str, data: Option<Value>) {
        self.log(Level::Info, message, data);
    }

    fn error(&self, message: &str, data: Option<Value>) {
        self.log(Level::Error, message, data);
    }
}

impl<L: LogSink + ?Sized> LogSink for &L {
    fn emit(&self, record: LogRecord) {
        (**self).emit(record);
    }
}

impl<L: LogSink + ?Sized> LogSink for Arc<L> {
    fn emit(&self, record: LogRecord) {
        (**self).emit(record);
    }
}

impl<L: LogSink + ?Sized> LogSink for Box<L> {
    fn emit(&self, record: LogRecord) {
        (**self).emit(record);
    }
}

/// Writes each record as one JSON object followed by a newline
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for JsonLinesSink<W> {
    fn emit(&self, record: LogRecord) {
        let line = record.to_json_line();
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write log record: {}", e);
        }
    }
}

/// Keeps records in memory, in emission order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}
