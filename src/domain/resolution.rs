//! Resolution pass and its partitioned result
//!
//! A pass walks the snapshot once in task order, classifies every task that
//! passes the filter, and tallies the outcome. Excluded tasks leave no trace in
//! the result.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use super::availability::{Availability, AvailabilityClassifier, BlockReason};
use super::day::Day;
use super::id::TaskId;
use super::snapshot::{Container, Snapshot};
use super::task::Task;

/// Project label for tasks without a project
pub const INBOX_LABEL: &str = "Inbox";

/// Project label for tasks whose project is missing from the snapshot
pub const NO_PROJECT_LABEL: &str = "(No Project)";

/// Per-reason counts of blocked tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTally {
    pub project_on_hold: usize,
    pub project_deferred: usize,
    pub task_deferred: usize,
    #[serde(rename = "sequential")]
    pub sequential_block: usize,
}

impl BlockedTally {
    pub fn record(&mut self, reason: BlockReason) {
        *self.slot(reason) += 1;
    }

    pub fn count(&self, reason: BlockReason) -> usize {
        match reason {
            BlockReason::ProjectOnHold => self.project_on_hold,
            BlockReason::ProjectDeferred => self.project_deferred,
            BlockReason::TaskDeferred => self.task_deferred,
            BlockReason::SequentialBlock => self.sequential_block,
        }
    }

    pub fn total(&self) -> usize {
        self.project_on_hold + self.project_deferred + self.task_deferred + self.sequential_block
    }

    fn slot(&mut self, reason: BlockReason) -> &mut usize {
        match reason {
            BlockReason::ProjectOnHold => &mut self.project_on_hold,
            BlockReason::ProjectDeferred => &mut self.project_deferred,
            BlockReason::TaskDeferred => &mut self.task_deferred,
            BlockReason::SequentialBlock => &mut self.sequential_block,
        }
    }
}

/// One available task, flattened for output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTask {
    pub id: TaskId,
    pub name: String,
    pub note: String,
    pub project_name: String,
    pub tags: Vec<String>,
    #[serde(serialize_with = "instant_or_empty")]
    pub due_date: Option<DateTime<Utc>>,
    pub flagged: bool,
    pub estimated_minutes: u32,
    #[serde(serialize_with = "instant_or_empty")]
    pub defer_date: Option<DateTime<Utc>>,
}

/// Absent dates are written as an empty string, present ones as RFC 3339
fn instant_or_empty<S: Serializer>(at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match at {
        Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => serializer.serialize_str(""),
    }
}

impl AvailableTask {
    fn from_task(task: &Task, container: Container<'_>) -> Self {
        let project_name = match container {
            Container::Inbox => INBOX_LABEL.to_string(),
            Container::Project(project) => project.name.clone(),
            Container::Missing(_) => NO_PROJECT_LABEL.to_string(),
        };

        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            note: task.note.clone(),
            project_name,
            tags: task.tags.clone(),
            due_date: task.due_date,
            flagged: task.flagged,
            estimated_minutes: task.estimated_minutes.unwrap_or(0),
            defer_date: task.defer_date,
        }
    }
}

/// Restricts which tasks take part in a pass
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Lowercased search text
    query: Option<String>,
}

impl TaskFilter {
    /// A filter that admits every task
    pub fn all() -> Self {
        Self::default()
    }

    /// Admits tasks whose name or note contains `query`, ignoring case
    ///
    /// An empty query admits every task. Whitespace is part of the query.
    pub fn query(query: &str) -> Self {
        let query = query.to_lowercase();
        Self {
            query: (!query.is_empty()).then_some(query),
        }
    }

    pub fn admits(&self, task: &Task) -> bool {
        match &self.query {
            Some(needle) => task.matches(needle),
            None => true,
        }
    }
}

/// Partitioned outcome of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    #[serde(rename = "tasks")]
    pub available: Vec<AvailableTask>,
    pub blocked: BlockedTally,
    pub total_available: usize,
    pub total_blocked: usize,
}

impl Resolution {
    /// Runs a fresh pass over `snapshot` as of `today`
    pub fn resolve(snapshot: &Snapshot, today: Day, filter: &TaskFilter) -> Self {
        let mut classifier = AvailabilityClassifier::new(today);
        Self::resolve_with(&mut classifier, snapshot, today, filter)
    }

    /// Runs a pass with an existing classifier, resetting its per-pass state first
    pub fn resolve_with(
        classifier: &mut AvailabilityClassifier,
        snapshot: &Snapshot,
        today: Day,
        filter: &TaskFilter,
    ) -> Self {
        classifier.begin_pass(today);

        let mut available = Vec::new();
        let mut blocked = BlockedTally::default();

        for task in snapshot.tasks() {
            // Closed tasks are dropped before the filter so they never count as matches
            if !task.is_open() || !filter.admits(task) {
                continue;
            }

            let container = snapshot.container_of(task);
            if let Container::Missing(project_id) = container {
                tracing::debug!(task = %task.id, project = %project_id, "project not in snapshot, treating as inbox");
            }

            match classifier.classify(task, container.project(), snapshot) {
                Availability::Available => available.push(AvailableTask::from_task(task, container)),
                Availability::Blocked(reason) => blocked.record(reason),
                Availability::Excluded(_) => {}
            }
        }

        tracing::info!(
            available = available.len(),
            blocked = blocked.total(),
            gate_scans = classifier.gate_scans(),
            "resolution pass complete"
        );

        Self {
            total_available: available.len(),
            total_blocked: blocked.total(),
            available,
            blocked,
        }
    }

    /// Classifies a single task of `snapshot`, or None if the ID is unknown
    pub fn explain(snapshot: &Snapshot, today: Day, id: &TaskId) -> Option<Availability> {
        let task = snapshot.task(id)?;
        let mut classifier = AvailabilityClassifier::new(today);
        Some(classifier.classify(task, snapshot.container_of(task).project(), snapshot))
    }

    /// IDs of the available tasks, in snapshot order
    pub fn available_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.available.iter().map(|t| &t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Project, ProjectId, ProjectStatus};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn today() -> Day {
        Day::on(&Utc, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
    }

    fn pid(id: &str) -> ProjectId {
        id.parse().unwrap()
    }

    fn task(id: &str, name: &str) -> Task {
        Task::new(id.parse().unwrap(), name)
    }

    fn ids(resolution: &Resolution) -> Vec<&str> {
        resolution.available_ids().map(TaskId::as_str).collect()
    }

    fn mixed_snapshot() -> Snapshot {
        let tomorrow = today().start() + Duration::days(1);
        Snapshot::from_parts(
            [
                Project::new(pid("hold"), "Someday").with_status(ProjectStatus::OnHold),
                Project::new(pid("later"), "Taxes").deferred_until(tomorrow),
                Project::new(pid("seq"), "Release").sequential(),
                Project::new(pid("done"), "Moved").completed(),
                Project::new(pid("errands"), "Errands"),
            ],
            [
                task("i1", "Buy milk"),
                task("i2", "Renew passport").deferred_until(tomorrow),
                task("h1", "Plant tulips").in_project(pid("hold")),
                task("l1", "File return").in_project(pid("later")),
                task("s1", "Tag build").in_project(pid("seq")),
                task("s2", "Publish notes").in_project(pid("seq")),
                task("d1", "Unpack").in_project(pid("done")),
                task("e1", "Post office").in_project(pid("errands")),
                task("e2", "Pharmacy").in_project(pid("errands")).completed(),
            ],
        )
    }

    #[test]
    fn partitions_mixed_snapshot() {
        let resolution = Resolution::resolve(&mixed_snapshot(), today(), &TaskFilter::all());

        assert_eq!(ids(&resolution), vec!["i1", "s1", "e1"]);
        assert_eq!(resolution.blocked.project_on_hold, 1);
        assert_eq!(resolution.blocked.project_deferred, 1);
        assert_eq!(resolution.blocked.task_deferred, 1);
        assert_eq!(resolution.blocked.sequential_block, 1);
        assert_eq!(resolution.total_available, 3);
        assert_eq!(resolution.total_blocked, 4);
    }

    #[test]
    fn project_labels() {
        let snapshot = Snapshot::from_parts(
            [Project::new(pid("p"), "Errands")],
            [
                task("a", "Inbox thing"),
                task("b", "Filed thing").in_project(pid("p")),
                task("c", "Orphan thing").in_project(pid("vanished")),
            ],
        );
        let resolution = Resolution::resolve(&snapshot, today(), &TaskFilter::all());

        let labels: Vec<_> = resolution.available.iter().map(|t| t.project_name.as_str()).collect();
        assert_eq!(labels, vec![INBOX_LABEL, "Errands", NO_PROJECT_LABEL]);
    }

    #[test]
    fn query_filters_before_classification() {
        let resolution = Resolution::resolve(&mixed_snapshot(), today(), &TaskFilter::query("PASSPORT"));

        // The matching task is deferred; nothing else is counted
        assert!(resolution.available.is_empty());
        assert_eq!(resolution.total_blocked, 1);
        assert_eq!(resolution.blocked.task_deferred, 1);
    }

    #[test]
    fn query_does_not_narrow_sequential_gate() {
        // s1 is filtered out but still gates s2
        let resolution = Resolution::resolve(&mixed_snapshot(), today(), &TaskFilter::query("publish"));

        assert!(resolution.available.is_empty());
        assert_eq!(resolution.blocked.sequential_block, 1);
    }

    #[test]
    fn query_matches_note() {
        let snapshot = Snapshot::from_tasks([
            task("a", "Call").with_note("ask about the invoice"),
            task("b", "Email"),
        ]);
        let resolution = Resolution::resolve(&snapshot, today(), &TaskFilter::query("Invoice"));

        assert_eq!(ids(&resolution), vec!["a"]);
    }

    #[test]
    fn empty_query_admits_everything() {
        assert!(TaskFilter::query("").admits(&task("a", "anything")));
    }

    #[test]
    fn query_whitespace_is_significant() {
        let filter = TaskFilter::query(" milk");
        assert!(filter.admits(&task("a", "Buy milk")));
        assert!(!filter.admits(&task("b", "milkshake")));
    }

    #[test]
    fn available_task_fields() {
        let due = Utc.with_ymd_and_hms(2026, 1, 23, 17, 0, 0).unwrap();
        let mut t = task("a", "Write report").with_note("quarterly");
        t.tags = vec!["work".to_string(), "focus".to_string()];
        t.flagged = true;
        t.due_date = Some(due);

        let resolution = Resolution::resolve(&Snapshot::from_tasks([t]), today(), &TaskFilter::all());
        let entry = &resolution.available[0];

        assert_eq!(entry.name, "Write report");
        assert_eq!(entry.note, "quarterly");
        assert_eq!(entry.tags, vec!["work", "focus"]);
        assert!(entry.flagged);
        assert_eq!(entry.due_date, Some(due));
        assert_eq!(entry.estimated_minutes, 0);
    }

    #[test]
    fn serializes_with_external_field_names() {
        let resolution = Resolution::resolve(&mixed_snapshot(), today(), &TaskFilter::all());
        let json = serde_json::to_value(&resolution).unwrap();

        assert_eq!(json["totalAvailable"], 3);
        assert_eq!(json["totalBlocked"], 4);
        assert_eq!(json["blocked"]["projectOnHold"], 1);
        assert_eq!(json["blocked"]["sequential"], 1);
        assert_eq!(json["tasks"][0]["projectName"], "Inbox");
        assert_eq!(json["tasks"][0]["id"], "i1");
    }

    #[test]
    fn absent_dates_serialize_as_empty_strings() {
        let mut t = task("a", "Write report");
        t.due_date = Some(Utc.with_ymd_and_hms(2026, 1, 23, 17, 0, 0).unwrap());

        let resolution = Resolution::resolve(&Snapshot::from_tasks([t]), today(), &TaskFilter::all());
        let json = serde_json::to_value(&resolution).unwrap();

        assert_eq!(json["tasks"][0]["dueDate"], "2026-01-23T17:00:00Z");
        assert_eq!(json["tasks"][0]["deferDate"], "");
    }

    #[test]
    fn classifier_reuse_rescans_each_pass() {
        let mut classifier = AvailabilityClassifier::new(today());
        let snapshot = mixed_snapshot();

        Resolution::resolve_with(&mut classifier, &snapshot, today(), &TaskFilter::all());
        assert_eq!(classifier.gate_scans(), 1);

        Resolution::resolve_with(&mut classifier, &snapshot, today(), &TaskFilter::all());
        assert_eq!(classifier.gate_scans(), 1);
    }

    #[test]
    fn explain_reports_exclusion_cause() {
        let snapshot = mixed_snapshot();

        assert_eq!(
            Resolution::explain(&snapshot, today(), &"d1".parse().unwrap()),
            Some(Availability::Excluded(crate::domain::Exclusion::ProjectCompleted))
        );
        assert_eq!(
            Resolution::explain(&snapshot, today(), &"s2".parse().unwrap()),
            Some(Availability::Blocked(BlockReason::SequentialBlock))
        );
        assert_eq!(Resolution::explain(&snapshot, today(), &"nope".parse().unwrap()), None);
    }

    #[test]
    fn tally_total_matches_counts() {
        let mut tally = BlockedTally::default();
        for reason in BlockReason::ALL {
            tally.record(reason);
        }
        tally.record(BlockReason::TaskDeferred);

        assert_eq!(tally.count(BlockReason::TaskDeferred), 2);
        assert_eq!(tally.total(), 5);
    }
}
