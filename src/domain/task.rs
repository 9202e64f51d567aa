//! Task domain model
//!
//! A task is a read-only snapshot of one record from the task store.
//! Only `completed`, `dropped`, `defer_date` and `project_id` take part in
//! availability decisions; the remaining fields are carried through to results.

use chrono::{DateTime, Utc};

use super::day::Day;
use super::id::{ProjectId, TaskId};

/// A task snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable name
    pub name: String,

    /// Free-form note
    pub note: String,

    /// Containing project, or None for inbox tasks
    pub project_id: Option<ProjectId>,

    pub completed: bool,
    pub dropped: bool,

    /// The task is not actionable before the day of this instant
    pub defer_date: Option<DateTime<Utc>>,

    pub due_date: Option<DateTime<Utc>>,
    pub flagged: bool,
    pub estimated_minutes: Option<u32>,

    /// Tag names, in store order
    pub tags: Vec<String>,
}

impl Task {
    /// Creates an open inbox task with the given ID and name
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            note: String::new(),
            project_id: None,
            completed: false,
            dropped: false,
            defer_date: None,
            due_date: None,
            flagged: false,
            estimated_minutes: None,
            tags: Vec::new(),
        }
    }

    /// Places the task in a project
    pub fn in_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Defers the task until the given instant
    pub fn deferred_until(mut self, at: DateTime<Utc>) -> Self {
        self.defer_date = Some(at);
        self
    }

    /// Marks the task completed
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Marks the task dropped
    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }

    /// Sets the note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Returns true if the task is still open (neither completed nor dropped)
    pub fn is_open(&self) -> bool {
        !self.completed && !self.dropped
    }

    /// Returns true if the task's own defer date falls on a day after `today`
    pub fn is_deferred(&self, today: &Day) -> bool {
        self.defer_date.is_some_and(|at| today.is_before(at))
    }

    /// Case-insensitive substring match against name and note
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.note.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn task(id: &str) -> Task {
        Task::new(id.parse().unwrap(), format!("Task {}", id))
    }

    fn day(d: u32) -> Day {
        Day::on(&Utc, NaiveDate::from_ymd_opt(2026, 3, d).unwrap())
    }

    #[test]
    fn new_task_is_open_and_in_inbox() {
        let t = task("t1");
        assert!(t.is_open());
        assert!(t.project_id.is_none());
        assert!(!t.is_deferred(&day(1)));
    }

    #[test]
    fn completed_or_dropped_is_not_open() {
        assert!(!task("t1").completed().is_open());
        assert!(!task("t2").dropped().is_open());
    }

    #[test]
    fn deferral_ignores_time_of_day() {
        let t = task("t1").deferred_until(Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap());
        assert!(t.is_deferred(&day(9)));
        assert!(!t.is_deferred(&day(10)));
        assert!(!t.is_deferred(&day(11)));
    }

    #[test]
    fn matches_name_or_note_case_insensitively() {
        let t = Task::new("t1".parse().unwrap(), "Call Plumber").with_note("Ask about the BOILER");
        assert!(t.matches("plumber"));
        assert!(t.matches("boiler"));
        assert!(!t.matches("dentist"));
    }
}
