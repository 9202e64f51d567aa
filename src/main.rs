//! actionable - Show which tasks can be worked on right now

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = actionable::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
