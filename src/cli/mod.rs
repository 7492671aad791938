//! Command line interface for release_pipeline.
//!
//! Parses arguments, loads configuration and dispatches to the command
//! executors, which turn every outcome into a process exit code.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, MatrixArgs, ReleaseArgs, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
