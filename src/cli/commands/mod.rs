//! Command execution: wire the configured capabilities into a pipeline and run it.

mod build;
mod preview;
mod release;
mod version;

use crate::build::CargoCompiler;
use crate::cli::{Args, Command, OutputManager, RuntimeConfig};
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::{CliError, ReleaseError, Result};

use build::execute_build;
use preview::execute_preview;
use release::execute_release;
use version::execute_version;

/// Execute the selected command and map the outcome to an exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let command = args.resolved_command();
    if let Err(reason) = args.validate() {
        let error: ReleaseError = CliError::InvalidArguments { reason }.into();
        report_failure(&OutputManager::default(), command.name(), &error);
        return Ok(1);
    }

    let mut config = match RuntimeConfig::from_args(&args, EnvConfig::from_env()) {
        Ok(config) => config,
        Err(e) => {
            let output = OutputManager::default();
            report_failure(&output, command.name(), &e);
            return Ok(1);
        }
    };

    let result = match &command {
        Command::Release(release) => execute_release(release, &mut config).await,
        Command::Version => execute_version(&config),
        Command::Build(matrix) => execute_build(matrix, &mut config).await,
        Command::Preview { matrix, tag_prefix } => {
            execute_preview(matrix, tag_prefix.as_deref(), &mut config)
        }
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(config.output(), command.name(), &e);
            Ok(1)
        }
    }
}

fn report_failure(output: &OutputManager, command: &str, error: &ReleaseError) {
    output.error(&format!("Command '{command}' failed: {error}"));

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() && !output.is_quiet() {
        let _ = output.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            let _ = output.println(&format!("  • {suggestion}"));
        }
    }
}

/// Compiler configured from the pipeline settings
fn compiler(config: &PipelineConfig) -> CargoCompiler {
    let compiler = CargoCompiler::new().with_extra_files(config.extra_files.clone());
    match &config.target_dir {
        Some(dir) => compiler.with_target_dir(dir.clone()),
        None => compiler,
    }
}
