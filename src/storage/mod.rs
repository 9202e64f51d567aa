//! # Storage Layer
//!
//! Adapter between the external task store and the domain snapshot.
//!
//! ## Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Snapshot | JSONL, one tagged record per line | `--snapshot`, `$ACTIONABLE_SNAPSHOT`, or `snapshot` in config |
//! | Config | TOML | `~/.config/actionable/config.toml` (platform dependent) |
//!
//! ## Failure Model
//!
//! - A snapshot that cannot be opened or read is a [`StoreError`]; no partial
//!   result is produced.
//! - A single malformed record is skipped and listed in the [`LoadReport`].
//! - An unreadable optional field falls back to its default (see [`record`]).
//!
//! ## Key Types
//!
//! - [`SnapshotStore`] - Reads a JSONL snapshot into a [`Snapshot`](crate::domain::Snapshot)
//! - [`Config`] - User configuration

mod jsonl;
mod config;
pub mod record;

pub use jsonl::{FieldFallback, LoadReport, SkippedRecord, SnapshotStore, StoreError};
pub use config::{Config, ConfigError};
pub use record::{Fallback, RecordError, RecordKind};
