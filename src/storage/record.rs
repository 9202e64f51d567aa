//! Tolerant decoding of snapshot records
//!
//! Each line of a snapshot is one JSON object tagged with `"type": "task"` or
//! `"type": "project"`. Decoding never fails because of an optional field: a
//! field that is present but unreadable falls back to its default and is
//! reported as a [`Fallback`]. Only a record without a readable identity is
//! rejected.
//!
//! | Field | Default |
//! |-------|---------|
//! | `name`, `note` | empty string |
//! | `completed`, `dropped`, `flagged`, `sequential` | `false` |
//! | `defer_date`, `due_date` | absent |
//! | `project_id` | absent (inbox) |
//! | `tags` | empty; unreadable entries ignored |
//! | `estimated_minutes` | absent |
//! | `status` | active |

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::domain::{Project, ProjectId, ProjectStatus, Task, TaskId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,

    #[error("Line is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Record has no 'type' field")]
    MissingType,

    #[error("Unknown record type: '{0}'")]
    UnknownType(String),

    #[error("{0} record has no readable 'id'")]
    MissingId(RecordKind),

    #[error("Duplicate {0} id: {1}")]
    Duplicate(RecordKind, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    Project,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Task => f.write_str("task"),
            RecordKind::Project => f.write_str("project"),
        }
    }
}

/// A field that was present but could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Task(Task),
    Project(Project),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Task(_) => RecordKind::Task,
            Record::Project(_) => RecordKind::Project,
        }
    }
}

/// A decoded record plus the fields that fell back to defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub record: Record,
    pub fallbacks: Vec<Fallback>,
}

/// Decodes one snapshot line
pub fn decode_line(line: &str) -> Result<Decoded, RecordError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| RecordError::InvalidJson(e.to_string()))?;
    decode_value(&value)
}

/// Decodes one already-parsed record
pub fn decode_value(value: &Value) -> Result<Decoded, RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

    let kind = obj
        .get("type")
        .or_else(|| obj.get("kind"))
        .ok_or(RecordError::MissingType)?;
    let kind = kind.as_str().ok_or(RecordError::MissingType)?;

    let mut fields = Fields::new(obj);
    let record = match kind.trim().to_lowercase().as_str() {
        "task" => Record::Task(decode_task(&mut fields)?),
        "project" => Record::Project(decode_project(&mut fields)?),
        other => return Err(RecordError::UnknownType(other.to_string())),
    };

    Ok(Decoded {
        record,
        fallbacks: fields.fallbacks,
    })
}

fn decode_task(fields: &mut Fields<'_>) -> Result<Task, RecordError> {
    let id: TaskId = fields
        .id()
        .and_then(|s| s.parse().ok())
        .ok_or(RecordError::MissingId(RecordKind::Task))?;

    let project_id = fields
        .opt_string("project_id", &["project_id", "projectId", "containingProjectId"])
        .and_then(|s| match s.parse::<ProjectId>() {
            Ok(id) => Some(id),
            Err(e) => {
                fields.fall_back("project_id", e.to_string());
                None
            }
        });

    Ok(Task {
        id,
        name: fields.string("name", &["name"]),
        note: fields.string("note", &["note"]),
        project_id,
        completed: fields.flag("completed", &["completed"]),
        dropped: fields.flag("dropped", &["dropped"]),
        defer_date: fields.instant("defer_date", &["defer_date", "deferDate"]),
        due_date: fields.instant("due_date", &["due_date", "dueDate"]),
        flagged: fields.flag("flagged", &["flagged"]),
        estimated_minutes: fields.minutes("estimated_minutes", &["estimated_minutes", "estimatedMinutes"]),
        tags: fields.tags("tags", &["tags"]),
    })
}

fn decode_project(fields: &mut Fields<'_>) -> Result<Project, RecordError> {
    let id: ProjectId = fields
        .id()
        .and_then(|s| s.parse().ok())
        .ok_or(RecordError::MissingId(RecordKind::Project))?;

    let mut completed = fields.flag("completed", &["completed"]);
    let status = match fields.opt_string("status", &["status"]) {
        None => ProjectStatus::Active,
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            // The store reports finished projects as a status; completion is its own flag here
            "done" | "completed" => {
                completed = true;
                ProjectStatus::Active
            }
            _ => raw.parse().unwrap_or_else(|e: crate::domain::UnknownStatus| {
                fields.fall_back("status", e.to_string());
                ProjectStatus::Active
            }),
        },
    };

    Ok(Project {
        id,
        name: fields.string("name", &["name"]),
        status,
        completed,
        defer_date: fields.instant("defer_date", &["defer_date", "deferDate"]),
        sequential: fields.flag("sequential", &["sequential"]),
    })
}

/// Field reader that records every fallback it takes
struct Fields<'a> {
    obj: &'a Map<String, Value>,
    fallbacks: Vec<Fallback>,
}

impl<'a> Fields<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            fallbacks: Vec::new(),
        }
    }

    /// First present, non-null value among `names`
    fn lookup(&self, names: &[&str]) -> Option<&'a Value> {
        names
            .iter()
            .filter_map(|name| self.obj.get(*name))
            .find(|v| !v.is_null())
    }

    fn fall_back(&mut self, field: &'static str, reason: impl Into<String>) {
        self.fallbacks.push(Fallback {
            field,
            reason: reason.into(),
        });
    }

    fn wrong_type(&mut self, field: &'static str, expected: &str, got: &Value) {
        self.fall_back(field, format!("expected {}, got {}", expected, type_name(got)));
    }

    fn id(&self) -> Option<&'a str> {
        self.lookup(&["id"]).and_then(Value::as_str)
    }

    fn opt_string(&mut self, field: &'static str, names: &[&str]) -> Option<String> {
        let value = self.lookup(names)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.wrong_type(field, "string", value);
                None
            }
        }
    }

    fn string(&mut self, field: &'static str, names: &[&str]) -> String {
        self.opt_string(field, names).unwrap_or_default()
    }

    fn flag(&mut self, field: &'static str, names: &[&str]) -> bool {
        let Some(value) = self.lookup(names) else {
            return false;
        };
        match value.as_bool() {
            Some(b) => b,
            None => {
                self.wrong_type(field, "boolean", value);
                false
            }
        }
    }

    fn instant(&mut self, field: &'static str, names: &[&str]) -> Option<DateTime<Utc>> {
        let raw = self.opt_string(field, names)?;
        // The store exports absent dates as empty strings
        if raw.trim().is_empty() {
            return None;
        }
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                self.fall_back(field, format!("invalid timestamp '{}': {}", raw, e));
                None
            }
        }
    }

    fn minutes(&mut self, field: &'static str, names: &[&str]) -> Option<u32> {
        let value = self.lookup(names)?;
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.wrong_type(field, "non-negative integer", value);
                None
            }
        }
    }

    /// Accepts tag names as strings or as objects with a `name`
    fn tags(&mut self, field: &'static str, names: &[&str]) -> Vec<String> {
        let Some(value) = self.lookup(names) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.wrong_type(field, "array", value);
            return Vec::new();
        };

        let mut tags = Vec::with_capacity(items.len());
        let mut ignored = 0;
        for item in items {
            let name = item
                .as_str()
                .or_else(|| item.get("name").and_then(Value::as_str));
            match name {
                Some(name) => tags.push(name.to_string()),
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            self.fall_back(field, format!("ignored {} unreadable tag(s)", ignored));
        }
        tags
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(line: &str) -> (Task, Vec<Fallback>) {
        let decoded = decode_line(line).unwrap();
        match decoded.record {
            Record::Task(t) => (t, decoded.fallbacks),
            other => panic!("expected task, got {:?}", other),
        }
    }

    fn project(line: &str) -> (Project, Vec<Fallback>) {
        let decoded = decode_line(line).unwrap();
        match decoded.record {
            Record::Project(p) => (p, decoded.fallbacks),
            other => panic!("expected project, got {:?}", other),
        }
    }

    fn fields(fallbacks: &[Fallback]) -> Vec<&'static str> {
        fallbacks.iter().map(|f| f.field).collect()
    }

    #[test]
    fn full_task_record() {
        let (t, fallbacks) = task(
            r#"{"type":"task","id":"hQ2x","name":"Book flights","note":"window seat",
                "project_id":"p-trip","completed":false,"dropped":false,
                "defer_date":"2026-04-01T09:00:00+02:00","due_date":"2026-04-10T00:00:00Z",
                "flagged":true,"estimated_minutes":45,"tags":["travel",{"name":"online"}]}"#,
        );

        assert!(fallbacks.is_empty());
        assert_eq!(t.id.as_str(), "hQ2x");
        assert_eq!(t.name, "Book flights");
        assert_eq!(t.note, "window seat");
        assert_eq!(t.project_id.as_ref().map(ProjectId::as_str), Some("p-trip"));
        assert_eq!(t.defer_date, Some(Utc.with_ymd_and_hms(2026, 4, 1, 7, 0, 0).unwrap()));
        assert_eq!(t.due_date, Some(Utc.with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap()));
        assert!(t.flagged);
        assert_eq!(t.estimated_minutes, Some(45));
        assert_eq!(t.tags, vec!["travel", "online"]);
    }

    #[test]
    fn camel_case_aliases() {
        let (t, fallbacks) = task(
            r#"{"type":"task","id":"a","containingProjectId":"p1","deferDate":"2026-04-01T00:00:00Z","estimatedMinutes":5}"#,
        );

        assert!(fallbacks.is_empty());
        assert_eq!(t.project_id.as_ref().map(ProjectId::as_str), Some("p1"));
        assert!(t.defer_date.is_some());
        assert_eq!(t.estimated_minutes, Some(5));
    }

    #[test]
    fn missing_optional_fields_use_defaults_silently() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a"}"#);

        assert!(fallbacks.is_empty());
        assert_eq!(t.name, "");
        assert!(t.is_open());
        assert!(t.project_id.is_none());
        assert!(t.defer_date.is_none());
    }

    #[test]
    fn null_and_empty_dates_are_absent() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","defer_date":null,"due_date":""}"#);

        assert!(fallbacks.is_empty());
        assert!(t.defer_date.is_none());
        assert!(t.due_date.is_none());
    }

    #[test]
    fn unreadable_flags_fall_back_to_false() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","completed":"yes","dropped":1}"#);

        assert!(!t.completed);
        assert!(!t.dropped);
        assert_eq!(fields(&fallbacks), vec!["completed", "dropped"]);
    }

    #[test]
    fn unreadable_defer_date_falls_back_to_absent() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","defer_date":"next tuesday"}"#);

        assert!(t.defer_date.is_none());
        assert_eq!(fields(&fallbacks), vec!["defer_date"]);
    }

    #[test]
    fn unreadable_project_reference_falls_back_to_inbox() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","project_id":42}"#);
        assert!(t.project_id.is_none());
        assert_eq!(fields(&fallbacks), vec!["project_id"]);

        let (t, fallbacks) = task(r#"{"type":"task","id":"b","project_id":"  "}"#);
        assert!(t.project_id.is_none());
        assert_eq!(fields(&fallbacks), vec!["project_id"]);
    }

    #[test]
    fn unreadable_name_and_minutes() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","name":["x"],"estimated_minutes":-3}"#);

        assert_eq!(t.name, "");
        assert!(t.estimated_minutes.is_none());
        assert_eq!(fields(&fallbacks), vec!["name", "estimated_minutes"]);
    }

    #[test]
    fn unreadable_tags_are_ignored() {
        let (t, fallbacks) = task(r#"{"type":"task","id":"a","tags":["home",7,{"label":"x"}]}"#);
        assert_eq!(t.tags, vec!["home"]);
        assert_eq!(fields(&fallbacks), vec!["tags"]);

        let (t, fallbacks) = task(r#"{"type":"task","id":"b","tags":"home"}"#);
        assert!(t.tags.is_empty());
        assert_eq!(fields(&fallbacks), vec!["tags"]);
    }

    #[test]
    fn task_without_id_is_rejected() {
        assert_eq!(
            decode_line(r#"{"type":"task","name":"ghost"}"#),
            Err(RecordError::MissingId(RecordKind::Task))
        );
        assert_eq!(
            decode_line(r#"{"type":"task","id":""}"#),
            Err(RecordError::MissingId(RecordKind::Task))
        );
        assert_eq!(
            decode_line(r#"{"type":"task","id":17}"#),
            Err(RecordError::MissingId(RecordKind::Task))
        );
    }

    #[test]
    fn project_record() {
        let (p, fallbacks) = project(
            r#"{"type":"project","id":"p1","name":"Trip","status":"on hold","sequential":true,"defer_date":"2026-06-01T00:00:00Z"}"#,
        );

        assert!(fallbacks.is_empty());
        assert_eq!(p.status, ProjectStatus::OnHold);
        assert!(p.sequential);
        assert!(!p.completed);
        assert!(p.defer_date.is_some());
    }

    #[test]
    fn done_status_sets_completed() {
        let (p, _) = project(r#"{"type":"project","id":"p1","status":"done"}"#);
        assert_eq!(p.status, ProjectStatus::Active);
        assert!(p.completed);
    }

    #[test]
    fn unknown_status_falls_back_to_active() {
        let (p, fallbacks) = project(r#"{"type":"project","id":"p1","status":"paused"}"#);
        assert_eq!(p.status, ProjectStatus::Active);
        assert_eq!(fields(&fallbacks), vec!["status"]);
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(decode_line("{not json"), Err(RecordError::InvalidJson(_))));
        assert_eq!(decode_line("[1,2]"), Err(RecordError::NotAnObject));
        assert_eq!(decode_line(r#"{"id":"a"}"#), Err(RecordError::MissingType));
        assert_eq!(
            decode_line(r#"{"type":"folder","id":"f"}"#),
            Err(RecordError::UnknownType("folder".to_string()))
        );
    }
}
