//! Pass-scoped memo of the first eligible task in each sequential project
//!
//! The first lookup for a project scans its task order once; every later lookup
//! in the same pass returns the stored answer, including "no eligible task".
//! The stored answer reflects the project as first seen and is never refreshed
//! within a pass.

use std::collections::HashMap;

use super::id::{ProjectId, TaskId};
use super::task::Task;

#[derive(Debug, Default)]
pub struct SequentialGateCache {
    gates: HashMap<ProjectId, Option<TaskId>>,
    scans: usize,
}

impl SequentialGateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first open task of `project`, scanning `ordered_tasks` only on a miss
    pub fn first_eligible<'t, F, I>(&mut self, project: &ProjectId, ordered_tasks: F) -> Option<&TaskId>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = &'t Task>,
    {
        let scans = &mut self.scans;
        self.gates
            .entry(project.clone())
            .or_insert_with(|| {
                *scans += 1;
                let first = ordered_tasks()
                    .into_iter()
                    .find(|task| task.is_open())
                    .map(|task| task.id.clone());
                tracing::debug!(
                    project = %project,
                    first_eligible = ?first.as_ref().map(TaskId::as_str),
                    "scanned sequential project"
                );
                first
            })
            .as_ref()
    }

    /// Forgets every memoized gate; called at the start of each pass
    pub fn clear(&mut self) {
        self.gates.clear();
        self.scans = 0;
    }

    /// Number of project scans performed since the last clear
    pub fn scans(&self) -> usize {
        self.scans
    }
}
