//! Query commands (available, explain)
//!
//! Both commands read the snapshot once and evaluate it in a single pass.

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{
    Availability, BlockReason, Container, Day, Resolution, Snapshot, TaskFilter, TaskId, INBOX_LABEL,
    NO_PROJECT_LABEL,
};
use crate::storage::SnapshotStore;

/// Loads the snapshot, logging anything that was skipped or defaulted
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let store = SnapshotStore::new(path);
    let (snapshot, report) = store.read().context("Failed to load task snapshot")?;

    if !report.is_clean() {
        tracing::info!(
            skipped = report.skipped.len(),
            fallbacks = report.fallbacks.len(),
            "snapshot had unreadable data"
        );
    }
    for skipped in &report.skipped {
        tracing::debug!(line = skipped.line, error = %skipped.error, "record skipped");
    }
    if snapshot.is_empty() {
        tracing::info!(path = %path.display(), projects = snapshot.project_count(), "snapshot has no tasks");
    }

    Ok(snapshot)
}

/// Show tasks available now, with a tally of blocked ones
pub fn available(output: &Output, snapshot: &Snapshot, today: Day, query: Option<&str>) -> Result<()> {
    let filter = match query {
        Some(q) => TaskFilter::query(q),
        None => TaskFilter::all(),
    };
    tracing::debug!(day = %today.date(), start = %today.start(), query = ?query, tasks = snapshot.len(), "resolving availability");

    let resolution = Resolution::resolve(snapshot, today, &filter);

    if output.is_json() {
        output.data(&resolution);
        return Ok(());
    }

    if resolution.available.is_empty() {
        println!("No available tasks.");
    } else {
        println!("Available tasks ({}):", resolution.total_available);
        println!("{:<20} {:<24} NAME", "ID", "PROJECT");
        println!("{}", "-".repeat(72));
        for task in &resolution.available {
            let marker = if task.flagged { " [!]" } else { "" };
            println!("{:<20} {:<24} {}{}", task.id, task.project_name, task.name, marker);
        }
    }

    println!();
    println!("Blocked: {}", resolution.total_blocked);
    for reason in BlockReason::ALL {
        let count = resolution.blocked.count(reason);
        if count > 0 {
            println!("  {:<18} {}", format!("{}:", capitalize(reason.label())), count);
        }
    }

    Ok(())
}

/// Explain why a single task is or is not available
pub fn explain(output: &Output, snapshot: &Snapshot, today: Day, task_id: &str) -> Result<()> {
    let id: TaskId = task_id
        .parse()
        .with_context(|| format!("Invalid task ID: '{}'", task_id))?;

    let task = snapshot
        .task(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;
    let availability = Resolution::explain(snapshot, today, &id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let project = match snapshot.container_of(task) {
        Container::Inbox => None,
        Container::Project(project) => Some(project.name.as_str()),
        Container::Missing(project_id) => {
            tracing::debug!(task = %task.id, project = %project_id, "project not in snapshot");
            Some(NO_PROJECT_LABEL)
        }
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "name": task.name,
            "project": project,
            "availability": availability,
        }));
        return Ok(());
    }

    println!("{} {}", task.id, task.name);
    println!("  Project: {}", project.unwrap_or(INBOX_LABEL));
    match availability {
        Availability::Available => println!("  Available"),
        Availability::Blocked(reason) => println!("  Blocked: {}", reason),
        Availability::Excluded(cause) => println!("  Excluded: {}", cause),
    }

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
