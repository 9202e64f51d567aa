//! actionable - Decide which tasks can be worked on right now
//!
//! Tasks live in projects that may be on hold, deferred, or sequential.
//! Given a snapshot of tasks and projects, actionable classifies every open
//! task as available or blocked (with a reason) and reports the available
//! ones together with per-reason blocked counts.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{
    Availability, AvailabilityClassifier, BlockReason, Day, Project, ProjectId, ProjectStatus, Resolution, Snapshot, Task,
    TaskFilter, TaskId,
};
