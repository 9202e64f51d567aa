//! Project domain model

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::day::Day;
use super::id::ProjectId;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown project status: '{0}'")]
pub struct UnknownStatus(pub String);

/// Status of a project
///
/// Completion is tracked separately in [`Project::completed`]; a project can be
/// completed while its status still reads `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Dropped,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Dropped => "dropped",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    /// Accepts the store's spelling (`on hold`) as well as `on-hold` and `on_hold`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "on hold" | "on-hold" | "on_hold" => Ok(ProjectStatus::OnHold),
            "dropped" => Ok(ProjectStatus::Dropped),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A project snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,

    pub name: String,

    pub status: ProjectStatus,

    pub completed: bool,

    /// Every task in the project is blocked before the day of this instant
    pub defer_date: Option<DateTime<Utc>>,

    /// Only the first open task is eligible
    pub sequential: bool,
}

impl Project {
    /// Creates an active, parallel project
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: ProjectStatus::Active,
            completed: false,
            defer_date: None,
            sequential: false,
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn deferred_until(mut self, at: DateTime<Utc>) -> Self {
        self.defer_date = Some(at);
        self
    }

    /// Returns true if the project's defer date falls on a day after `today`
    pub fn is_deferred(&self, today: &Day) -> bool {
        self.defer_date.is_some_and(|at| today.is_before(at))
    }
}
