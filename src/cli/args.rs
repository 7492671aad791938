//! Command line argument parsing.
//!
//! With no subcommand the full release runs: point it at a crate, it releases.

use crate::build::{ArchiveFormat, BuildTarget};
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Build, tag and publish a Rust binary from its manifest version
#[derive(Parser, Debug)]
#[command(
    name = "release_pipeline",
    version,
    about = "Build, tag and publish a Rust binary from its manifest version",
    long_about = "Reads package.version from Cargo.toml, cross-compiles the binary, \
pushes a tag named after the version and creates a GitHub release with the archives attached.

Usage:
  release_pipeline                      # full release with defaults
  release_pipeline release --draft
  release_pipeline preview --target x86_64-unknown-linux-musl
  release_pipeline version --manifest crates/app/Cargo.toml"
)]
pub struct Args {
    /// Config file (default: release-pipeline.toml next to the manifest)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Manifest holding package.version
    #[arg(long, global = true, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Show extra detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors and requested data
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to run (default: release)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Build matrix overrides shared by commands that compile
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MatrixArgs {
    /// Target triple to build; repeat for several (replaces the configured matrix)
    #[arg(long = "target", value_name = "TRIPLE")]
    pub targets: Vec<String>,

    /// Archive format for targets given with --target
    #[arg(long, value_name = "FORMAT", value_parser = parse_archive)]
    pub archive: Option<ArchiveFormat>,

    /// rustup toolchain for targets given with --target
    #[arg(long, value_name = "CHANNEL")]
    pub toolchain: Option<String>,
}

/// Flags for the full release
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Build matrix overrides
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Prefix for the tag name (e.g. v)
    #[arg(long, value_name = "PREFIX")]
    pub tag_prefix: Option<String>,

    /// Remote to push the tag to
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// GitHub repository as owner/repo
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Create the release as a draft
    #[arg(long)]
    pub draft: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build, tag and publish (default)
    Release(ReleaseArgs),

    /// Print the manifest version
    Version,

    /// Build and package without tagging or publishing
    Build(MatrixArgs),

    /// Show the tag, release and archive names a release would produce
    Preview {
        /// Build matrix overrides
        #[command(flatten)]
        matrix: MatrixArgs,

        /// Prefix for the tag name (e.g. v)
        #[arg(long, value_name = "PREFIX")]
        tag_prefix: Option<String>,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release(_) => "release",
            Command::Version => "version",
            Command::Build(_) => "build",
            Command::Preview { .. } => "preview",
        }
    }
}

fn parse_archive(value: &str) -> std::result::Result<ArchiveFormat, String> {
    value.parse()
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, defaulting to a full release
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Release(ReleaseArgs::default()))
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(manifest) = &self.manifest
            && manifest.as_os_str().is_empty()
        {
            return Err("--manifest must not be empty".to_string());
        }
        Ok(())
    }
}

impl MatrixArgs {
    /// Replace the configured matrix when targets were given on the command line
    pub fn apply(&self, config: &mut PipelineConfig) {
        if !self.targets.is_empty() {
            config.targets = self
                .targets
                .iter()
                .map(|triple| BuildTarget {
                    archive: self.archive.unwrap_or_default(),
                    toolchain: self
                        .toolchain
                        .clone()
                        .unwrap_or_else(|| crate::build::DEFAULT_TOOLCHAIN.to_string()),
                    ..BuildTarget::new(triple.clone())
                })
                .collect();
        } else {
            for target in &mut config.targets {
                if let Some(archive) = self.archive {
                    target.archive = archive;
                }
                if let Some(toolchain) = &self.toolchain {
                    target.toolchain = toolchain.clone();
                }
            }
        }
    }
}

/// Everything a command needs: output, merged configuration and environment
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    config: PipelineConfig,
    env: EnvConfig,
}

impl RuntimeConfig {
    /// Load the config file and layer the global flags on top
    pub fn from_args(args: &Args, env: EnvConfig) -> Result<Self> {
        let manifest_hint = args
            .manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from("Cargo.toml"));
        let project_root = crate::manifest::manifest_dir(&manifest_hint);

        let mut config = PipelineConfig::load(args.config.as_deref(), &project_root)?;
        if let Some(manifest) = &args.manifest {
            config.manifest = manifest.clone();
        }

        Ok(Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
            config,
            env,
        })
    }

    /// Assemble from parts
    pub fn new(output: super::OutputManager, config: PipelineConfig, env: EnvConfig) -> Self {
        Self {
            output,
            config,
            env,
        }
    }

    /// Output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Merged pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable configuration, for per-command flags
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Captured environment
    pub fn env(&self) -> &EnvConfig {
        &self.env
    }

    /// Manifest path from the merged configuration
    pub fn manifest(&self) -> &Path {
        &self.config.manifest
    }

    /// Re-check the configuration after flags were applied
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Print an error (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print a warning
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print a success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a plain line
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}
