//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `available [QUERY]` | Tasks that can be worked on now, plus blocked counts |
//! | `explain <TASK_ID>` | Classification of one task |
//!
//! Both read a JSONL snapshot given by `--snapshot`, `$ACTIONABLE_SNAPSHOT`,
//! or the `snapshot` config key, and accept `--today YYYY-MM-DD`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr, or set `RUST_LOG`:
//! ```bash
//! actionable --verbose available
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;

pub use app::{run, Cli, Commands, SourceArgs};
pub use output::{Output, OutputFormat};
