//! JSONL snapshot reader
//!
//! The task store exports one record per line. Records are read in file order,
//! which is also the task order used by sequential projects. The file is read
//! under a shared lock so a concurrent exporter cannot be observed mid-write.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use super::record::{decode_line, Fallback, Record, RecordError, RecordKind};
use crate::domain::Snapshot;

/// Failure to obtain the snapshot at all
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to open snapshot: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to acquire read lock on snapshot: {path}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read snapshot {path} at line {line}")]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// A record that was left out of the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 1-based line number
    pub line: usize,
    pub error: RecordError,
}

/// A field that fell back to its default while loading
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFallback {
    /// 1-based line number
    pub line: usize,
    pub fallback: Fallback,
}

/// What happened while loading a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub tasks: usize,
    pub projects: usize,
    pub skipped: Vec<SkippedRecord>,
    pub fallbacks: Vec<FieldFallback>,
}

impl LoadReport {
    /// Returns true if every record was read in full
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.fallbacks.is_empty()
    }
}

/// Store for snapshot data in JSONL format
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the whole snapshot
    ///
    /// Malformed records are skipped and reported; only failing to open or
    /// read the file is an error.
    pub fn read(&self) -> Result<(Snapshot, LoadReport), StoreError> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.clone())
            } else {
                StoreError::Open {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        FileExt::lock_shared(&file).map_err(|source| StoreError::Lock {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = BufReader::new(&file);
        let mut snapshot = Snapshot::new();
        let mut report = LoadReport::default();
        let mut buf = Vec::new();
        let mut line_num = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| StoreError::Read {
                    path: self.path.clone(),
                    line: line_num + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_num += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                self.skip(&mut report, line_num, RecordError::InvalidUtf8);
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }

            let decoded = match decode_line(line) {
                Ok(decoded) => decoded,
                Err(error) => {
                    self.skip(&mut report, line_num, error);
                    continue;
                }
            };

            let kind = decoded.record.kind();
            let (added, id) = match decoded.record {
                Record::Task(task) => {
                    let id = task.id.to_string();
                    (snapshot.add_task(task), id)
                }
                Record::Project(project) => {
                    let id = project.id.to_string();
                    (snapshot.add_project(project), id)
                }
            };
            if !added {
                self.skip(&mut report, line_num, RecordError::Duplicate(kind, id));
                continue;
            }

            match kind {
                RecordKind::Task => report.tasks += 1,
                RecordKind::Project => report.projects += 1,
            }
            for fallback in decoded.fallbacks {
                tracing::debug!(line = line_num, field = fallback.field, reason = %fallback.reason, "field fell back to default");
                report.fallbacks.push(FieldFallback {
                    line: line_num,
                    fallback,
                });
            }
        }

        // Lock is released when file is dropped
        tracing::debug!(
            path = %self.path.display(),
            tasks = report.tasks,
            projects = report.projects,
            skipped = report.skipped.len(),
            "loaded snapshot"
        );

        Ok((snapshot, report))
    }

    fn skip(&self, report: &mut LoadReport, line: usize, error: RecordError) {
        tracing::debug!(path = %self.path.display(), line, %error, "skipping record");
        report.skipped.push(SkippedRecord { line, error });
    }
}
