//! release_pipeline: build, tag and publish a Rust binary from its manifest version.

use release_pipeline::cli;
use release_pipeline::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::default();
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
