//! The JSON event log file.
//!
//! Each handled request appends one entry to a single JSON array on disk,
//! mirroring the whole-file discipline of the catalog store: read the array,
//! push, rewrite pretty-printed. The file is initialized to `[]` when absent.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors from event log I/O.
#[derive(Error, Debug)]
pub enum EventLogError {
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The log file does not parse as a JSON array of events.
    #[error("event log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single entry in the event log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Event name, e.g. `course-added`.
    pub event: String,
    /// Severity, `info` or `warning`.
    pub level: String,
    /// Unique id of this entry.
    pub event_id: Uuid,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Free-form extra fields, flattened into the entry.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogEvent {
    /// Creates an info-level event.
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            level: "info".to_string(),
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            fields: Map::new(),
        }
    }

    /// Creates a warning-level event.
    #[must_use]
    pub fn warning(event: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            ..Self::new(event)
        }
    }

    /// Attaches an extra field to the event.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Append-only log over a JSON array file.
pub struct EventLog {
    path: PathBuf,
    // Serializes the read-modify-write cycle within this process.
    lock: Mutex<()>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("path", &self.path).finish()
    }
}

impl EventLog {
    /// Opens the event log, creating the file as an empty array if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EventLogError> {
        let path = path.into();
        if !path.exists() {
            std::fs::write(&path, "[]")?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records an event.
    ///
    /// A failed write must not fail the request being handled; it is logged
    /// at WARN and dropped.
    pub fn record(&self, event: LogEvent) {
        if let Err(e) = self.append(&event) {
            tracing::warn!(event = %event.event, error = %e, "Failed to write event log entry");
        }
    }

    /// Returns every recorded event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read_all(&self) -> Result<Vec<LogEvent>, EventLogError> {
        let _guard = self.lock.lock();
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn append(&self, event: &LogEvent) -> Result<(), EventLogError> {
        let _guard = self.lock.lock();
        let contents = std::fs::read_to_string(&self.path)?;
        let mut entries: Vec<LogEvent> = serde_json::from_str(&contents)?;
        entries.push(event.clone());
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log() -> (tempfile::TempDir, EventLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("logoutput.json")).unwrap();
        (dir, log)
    }

    #[test]
    fn test_open_initializes_empty_array() {
        let (_dir, log) = temp_log();
        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents, "[]");
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_open_preserves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logoutput.json");

        let log = EventLog::open(&path).unwrap();
        log.record(LogEvent::new("index-page"));

        // Reopening must not truncate.
        let log = EventLog::open(&path).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_record_appends_in_order() {
        let (_dir, log) = temp_log();
        log.record(LogEvent::new("index-page").with("method", "GET"));
        log.record(
            LogEvent::new("course-added")
                .with("course_code", "CS101")
                .with("processing_time_ms", 1.5),
        );

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, "index-page");
        assert_eq!(entries[1].event, "course-added");
        assert_eq!(entries[1].fields["course_code"], "CS101");
    }

    #[test]
    fn test_warning_level_and_flattened_fields() {
        let (_dir, log) = temp_log();
        log.record(LogEvent::warning("course-not-found").with("course_code", "CS999"));

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let raw: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
        assert_eq!(raw[0]["level"], "warning");
        // Extra fields sit at the top level of the entry, not nested.
        assert_eq!(raw[0]["course_code"], "CS999");
    }
}
