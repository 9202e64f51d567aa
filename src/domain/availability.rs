//! Availability classification
//!
//! Decides whether a single task is actionable on a given local day, and if
//! not, why. Rules are evaluated in a fixed order and the first match wins:
//!
//! | # | Condition | Outcome |
//! |---|-----------|---------|
//! | 1 | task completed or dropped | excluded |
//! | 2 | task defer date on a later day | [`BlockReason::TaskDeferred`] |
//! | 3 | no project | available |
//! | 4 | project on hold | [`BlockReason::ProjectOnHold`] |
//! | 5 | project dropped or completed | excluded |
//! | 6 | project defer date on a later day | [`BlockReason::ProjectDeferred`] |
//! | 7 | sequential project, task is not the first open task | [`BlockReason::SequentialBlock`] |
//! | 8 | otherwise | available |
//!
//! Defer dates are compared by day: an item deferred to any time today is
//! already available. Rule 2 precedes rules 4 and 5, so a task deferred on its
//! own inside an on-hold or finished project reports `TaskDeferred`.

use serde::Serialize;
use std::fmt;

use super::day::Day;
use super::gate::SequentialGateCache;
use super::project::{Project, ProjectStatus};
use super::snapshot::Snapshot;
use super::task::Task;

/// Why an open task is not available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    ProjectOnHold,
    ProjectDeferred,
    TaskDeferred,
    SequentialBlock,
}

impl BlockReason {
    pub const ALL: [BlockReason; 4] = [
        BlockReason::ProjectOnHold,
        BlockReason::ProjectDeferred,
        BlockReason::TaskDeferred,
        BlockReason::SequentialBlock,
    ];

    /// Returns a display label for the reason
    pub fn label(&self) -> &'static str {
        match self {
            BlockReason::ProjectOnHold => "project on hold",
            BlockReason::ProjectDeferred => "project deferred",
            BlockReason::TaskDeferred => "task deferred",
            BlockReason::SequentialBlock => "sequential",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a task takes no part in the result at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    TaskCompleted,
    TaskDropped,
    ProjectCompleted,
    ProjectDropped,
}

impl Exclusion {
    pub fn label(&self) -> &'static str {
        match self {
            Exclusion::TaskCompleted => "task completed",
            Exclusion::TaskDropped => "task dropped",
            Exclusion::ProjectCompleted => "project completed",
            Exclusion::ProjectDropped => "project dropped",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Blocked(BlockReason),
    Excluded(Exclusion),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => f.write_str("available"),
            Availability::Blocked(reason) => write!(f, "blocked ({})", reason),
            Availability::Excluded(cause) => write!(f, "excluded ({})", cause),
        }
    }
}

/// Classifies tasks against a reference day
///
/// Holds the sequential gate memo for the current pass; call
/// [`AvailabilityClassifier::begin_pass`] before evaluating a new snapshot.
#[derive(Debug)]
pub struct AvailabilityClassifier {
    today: Day,
    gates: SequentialGateCache,
}

impl AvailabilityClassifier {
    pub fn new(today: Day) -> Self {
        Self {
            today,
            gates: SequentialGateCache::new(),
        }
    }

    /// Starts a new pass: resets the reference day and drops every memoized gate
    pub fn begin_pass(&mut self, today: Day) {
        self.today = today;
        self.gates.clear();
    }

    /// Project scans performed during the current pass
    pub fn gate_scans(&self) -> usize {
        self.gates.scans()
    }

    /// Classifies `task` given its resolved project
    ///
    /// `snapshot` supplies the project's task order for the sequential rule.
    pub fn classify(&mut self, task: &Task, project: Option<&Project>, snapshot: &Snapshot) -> Availability {
        if task.completed {
            return Availability::Excluded(Exclusion::TaskCompleted);
        }
        if task.dropped {
            return Availability::Excluded(Exclusion::TaskDropped);
        }

        if task.is_deferred(&self.today) {
            return Availability::Blocked(BlockReason::TaskDeferred);
        }

        let Some(project) = project else {
            return Availability::Available;
        };

        if project.status == ProjectStatus::OnHold {
            return Availability::Blocked(BlockReason::ProjectOnHold);
        }

        if project.status == ProjectStatus::Dropped {
            return Availability::Excluded(Exclusion::ProjectDropped);
        }
        if project.completed {
            return Availability::Excluded(Exclusion::ProjectCompleted);
        }

        if project.is_deferred(&self.today) {
            return Availability::Blocked(BlockReason::ProjectDeferred);
        }

        if project.sequential {
            let first = self
                .gates
                .first_eligible(&project.id, || snapshot.project_tasks(&project.id));
            if first.is_some_and(|id| id != &task.id) {
                return Availability::Blocked(BlockReason::SequentialBlock);
            }
        }

        Availability::Available
    }
}
