//! Audit record schema.
//!
//! Every notification from the orchestration engine is normalized into one
//! [`EventRecord`] before it reaches the log. A record is written as a single
//! JSON object per line and never refers to any other line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the append-only audit log.
///
/// All fields are always serialized; values the notification did not supply
/// appear as `null` so each line carries the full schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Which notification produced this record
    pub event_type: EventType,

    /// Invoking user for the run
    pub user_id: String,

    /// Correlates every record of one run
    pub session_id: String,

    /// Outcome classification
    pub status: Status,

    /// Coarse lifecycle phase
    pub phase: Phase,

    /// `<parent-dir>/<file>` of the executing pipeline definition
    pub playbook_id: Option<String>,

    /// Wall-clock run duration (finish record only)
    pub duration_seconds: Option<f64>,

    /// Target host name
    pub host: Option<String>,

    /// Task name
    pub task_name: Option<String>,

    /// Whether the task reported a state change
    pub changed: Option<bool>,

    /// File pulled in by an import (import phase only)
    pub imported_file: Option<String>,

    /// File an import could not find (import phase only)
    pub missing_file: Option<String>,

    /// Target environment label
    pub environment_name: Option<String>,

    /// When the record was built (ISO 8601)
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Create a record with every optional field left empty
    pub fn new(
        event_type: EventType,
        status: Status,
        phase: Phase,
        user_id: String,
        session_id: String,
    ) -> Self {
        Self {
            event_type,
            user_id,
            session_id,
            status,
            phase,
            playbook_id: None,
            duration_seconds: None,
            host: None,
            task_name: None,
            changed: None,
            imported_file: None,
            missing_file: None,
            environment_name: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_task(mut self, task_name: impl Into<String>) -> Self {
        self.task_name = Some(task_name.into());
        self
    }

    pub fn with_changed(mut self, changed: Option<bool>) -> Self {
        self.changed = changed;
        self
    }

    pub fn with_duration(mut self, duration_seconds: f64) -> Self {
        self.duration_seconds = Some(duration_seconds);
        self
    }

    /// Attach the imported file. Clears any missing file.
    pub fn with_imported_file(mut self, file: impl Into<String>) -> Self {
        self.imported_file = Some(file.into());
        self.missing_file = None;
        self
    }

    /// Attach the missing file. Clears any imported file.
    pub fn with_missing_file(mut self, file: impl Into<String>) -> Self {
        self.missing_file = Some(file.into());
        self.imported_file = None;
        self
    }
}

/// Notification kind a record was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// First play of the run began
    Start,

    /// Run completed; carries the aggregate outcome
    Stats,

    Ok,
    Skipped,
    Failed,
    Unreachable,

    /// A background task failed
    AsyncFailed,

    /// A referenced file was imported
    Import,

    /// A referenced file was missing
    NotImport,
}

/// Outcome classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Failed,
    Skipped,
    Unreachable,
    Imported,
    NotImported,
}

/// Coarse lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Finish,
    Task,
    Import,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record() -> EventRecord {
        EventRecord::new(
            EventType::Ok,
            Status::Ok,
            Phase::Task,
            "deploy".to_string(),
            "0190b8a4-5f4e-7c1a-9d3e-2b6f1a0c9e11".to_string(),
        )
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let json = serde_json::to_value(record()).unwrap();
        let object = json.as_object().unwrap();

        for key in [
            "playbook_id",
            "duration_seconds",
            "host",
            "task_name",
            "changed",
            "imported_file",
            "missing_file",
            "environment_name",
        ] {
            assert_eq!(object.get(key), Some(&Value::Null), "{key} should be null");
        }
    }

    #[test]
    fn test_wire_names() {
        let mut event = record().with_host("web-1").with_task("install").with_changed(Some(true));
        event.event_type = EventType::AsyncFailed;
        event.status = Status::NotImported;

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "async_failed");
        assert_eq!(json["status"], "NOT_IMPORTED");
        assert_eq!(json["phase"], "task");
        assert_eq!(json["host"], "web-1");
        assert_eq!(json["task_name"], "install");
        assert_eq!(json["changed"], true);
    }

    #[test]
    fn test_import_files_are_exclusive() {
        let event = record().with_imported_file("vars/a.yml").with_missing_file("vars/b.yml");
        assert_eq!(event.imported_file, None);
        assert_eq!(event.missing_file.as_deref(), Some("vars/b.yml"));

        let event = record().with_missing_file("vars/b.yml").with_imported_file("vars/a.yml");
        assert_eq!(event.missing_file, None);
        assert_eq!(event.imported_file.as_deref(), Some("vars/a.yml"));
    }

    #[test]
    fn test_serialized_record_is_single_line() {
        let event = record().with_task("echo \"multi\nline\"");
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains('\n'));
    }
}
