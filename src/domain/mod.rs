//! Domain models for actionable
//!
//! Contains the availability rules without any I/O concerns.

mod id;
mod task;
mod project;
mod snapshot;
mod day;
mod gate;
mod availability;
mod resolution;

pub use id::{IdError, ProjectId, TaskId};
pub use task::Task;
pub use project::{Project, ProjectStatus, UnknownStatus};
pub use snapshot::{Container, Snapshot};
pub use day::{midnight, Day};
pub use gate::SequentialGateCache;
pub use availability::{Availability, AvailabilityClassifier, BlockReason, Exclusion};
pub use resolution::{
    AvailableTask, BlockedTally, Resolution, TaskFilter, INBOX_LABEL, NO_PROJECT_LABEL,
};
