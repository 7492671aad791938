//! Pipeline configuration.
//!
//! Settings come from `release-pipeline.toml` in the project root (or the
//! file given with `--config`), with command line flags layered on top.
//! Without a file the defaults describe the single-target release: build
//! `x86_64-pc-windows-gnu` on the stable toolchain, zip it, tag the manifest
//! version and publish it.

mod env;

pub use env::EnvConfig;

use crate::build::BuildTarget;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "release-pipeline.toml";

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Manifest holding `package.version`
    pub manifest: PathBuf,
    /// Prefix the tag publisher adds to the version (e.g. `v`)
    pub tag_prefix: String,
    /// Annotation message for the tag; `{tag}` and `{version}` are substituted
    pub tag_message: String,
    /// Remote to push the tag to
    pub remote: String,
    /// GitHub repository as owner/repo; derived from the remote when absent
    pub repository: Option<String>,
    /// Create the release as a draft
    pub draft: bool,
    /// Release notes
    pub release_body: Option<String>,
    /// Files placed in every archive next to the binary
    pub extra_files: Vec<PathBuf>,
    /// Cargo target directory override
    pub target_dir: Option<PathBuf>,
    /// HTTP timeout for GitHub requests
    pub http_timeout_secs: u64,
    /// Build matrix
    pub targets: Vec<BuildTarget>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("Cargo.toml"),
            tag_prefix: String::new(),
            tag_message: "Release {tag}".to_string(),
            remote: "origin".to_string(),
            repository: None,
            draft: false,
            release_body: None,
            extra_files: Vec::new(),
            target_dir: None,
            http_timeout_secs: 300,
            targets: vec![BuildTarget::default()],
        }
    }
}

impl PipelineConfig {
    /// Parse a config from TOML text; `origin` names the source in errors
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: origin.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit`, or `<project_root>/release-pipeline.toml` if present, or defaults
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project_root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", project_root.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&content, &path)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets.into());
        }
        for target in &self.targets {
            target.validate()?;
        }
        if let Some(repo) = &self.repository {
            repo.parse::<crate::github::Repository>()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{ArchiveFormat, UploadMode};

    #[test]
    fn defaults_describe_single_windows_target() {
        let config = PipelineConfig::default();
        assert_eq!(config.manifest, PathBuf::from("Cargo.toml"));
        assert_eq!(config.tag_prefix, "");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.targets, vec![BuildTarget::default()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_full_file() {
        let config = PipelineConfig::from_toml(
            r#"
manifest = "crates/app/Cargo.toml"
tag_prefix = "v"
repository = "octo/tool"
draft = true
extra_files = ["README.md", "LICENSE"]

[[targets]]
triple = "x86_64-pc-windows-gnu"
archive = "zip"
toolchain = "nightly"

[[targets]]
triple = "x86_64-unknown-linux-musl"
archive = "tar.gz"
upload = "release"
"#,
            Path::new("release-pipeline.toml"),
        )
        .unwrap();

        assert_eq!(config.tag_prefix, "v");
        assert!(config.draft);
        assert_eq!(config.extra_files.len(), 2);
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].toolchain, "nightly");
        assert_eq!(config.targets[1].archive, ArchiveFormat::TarGz);
        assert_eq!(config.targets[1].upload, UploadMode::Release);
        assert_eq!(config.remote, "origin");
    }

    #[test]
    fn rejects_bad_configs() {
        let origin = Path::new("x.toml");
        assert!(PipelineConfig::from_toml("targets = []", origin).is_err());
        assert!(PipelineConfig::from_toml("[[targets]]\ntriple = \"windows\"", origin).is_err());
        assert!(PipelineConfig::from_toml("repository = \"nope\"", origin).is_err());
        assert!(PipelineConfig::from_toml("unknown_key = 1", origin).is_err());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, PipelineConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "tag_prefix = \"v\"\n").unwrap();
        let config = PipelineConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.tag_prefix, "v");
        assert_eq!(config.targets, vec![BuildTarget::default()]);

        assert!(PipelineConfig::load(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }
}
