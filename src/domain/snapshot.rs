//! Read-only snapshot of the task store
//!
//! A resolution pass evaluates exactly one snapshot. Task order is the order in
//! which tasks were added, and a project's task order is the subsequence of
//! tasks that belong to it.

use std::collections::HashMap;

use super::id::{ProjectId, TaskId};
use super::project::Project;
use super::task::Task;

/// Where a task lives, as resolved against the snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Container<'a> {
    /// No project reference at all
    Inbox,
    Project(&'a Project),
    /// The task references a project the snapshot does not contain
    Missing(&'a ProjectId),
}

impl<'a> Container<'a> {
    /// The project, if the reference resolved
    pub fn project(&self) -> Option<&'a Project> {
        match self {
            Container::Project(project) => Some(project),
            _ => None,
        }
    }
}

/// Tasks and projects read at the start of a pass
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tasks: Vec<Task>,
    task_index: HashMap<TaskId, usize>,
    projects: HashMap<ProjectId, Project>,
    /// Indices into `tasks`, per project, in insertion order
    project_order: HashMap<ProjectId, Vec<usize>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from projects and tasks; duplicate IDs keep the first record
    pub fn from_parts(
        projects: impl IntoIterator<Item = Project>,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Self {
        let mut snapshot = Self::new();
        for project in projects {
            snapshot.add_project(project);
        }
        for task in tasks {
            snapshot.add_task(task);
        }
        snapshot
    }

    /// Builds a snapshot with no projects
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut snapshot = Self::new();
        for task in tasks {
            snapshot.add_task(task);
        }
        snapshot
    }

    /// Adds a project. Returns false if a project with the same ID already exists.
    pub fn add_project(&mut self, project: Project) -> bool {
        if self.projects.contains_key(&project.id) {
            return false;
        }
        self.projects.insert(project.id.clone(), project);
        true
    }

    /// Appends a task. Returns false if a task with the same ID already exists.
    pub fn add_task(&mut self, task: Task) -> bool {
        if self.task_index.contains_key(&task.id) {
            return false;
        }

        let idx = self.tasks.len();
        if let Some(project_id) = &task.project_id {
            self.project_order
                .entry(project_id.clone())
                .or_default()
                .push(idx);
        }
        self.task_index.insert(task.id.clone(), idx);
        self.tasks.push(task);
        true
    }

    /// All tasks in snapshot order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.task_index.get(id).map(|&idx| &self.tasks[idx])
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.get(id)
    }

    /// Resolves a task's project reference
    pub fn container_of<'a>(&'a self, task: &'a Task) -> Container<'a> {
        match &task.project_id {
            None => Container::Inbox,
            Some(id) => match self.projects.get(id) {
                Some(project) => Container::Project(project),
                None => Container::Missing(id),
            },
        }
    }

    /// Tasks of a project in their defined order
    pub fn project_tasks<'a>(&'a self, id: &ProjectId) -> impl Iterator<Item = &'a Task> + 'a {
        self.project_order
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.tasks[idx])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
