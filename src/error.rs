//! Error types for release pipeline operations.
//!
//! Every pipeline step has its own error enum so the failing step can be told
//! apart from the error alone. All of them fold into [`ReleaseError`], which
//! also carries actionable recovery suggestions for the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release pipeline operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release pipeline operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Manifest reading errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Version validation errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Repository / checkout errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Tag creation and push errors
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    /// Compilation and packaging errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Release publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Pipeline configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Manifest reading errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid TOML
    #[error("Failed to parse manifest {path}: {reason}")]
    Parse {
        /// Manifest path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Requested field is absent
    #[error("Field '{field}' not found in {path}")]
    NotFound {
        /// Manifest path
        path: PathBuf,
        /// Dotted field name
        field: String,
    },

    /// Requested field exists but does not hold a string
    #[error("Field '{field}' in {path} is not a string (found {found})")]
    NotAString {
        /// Manifest path
        path: PathBuf,
        /// Dotted field name
        field: String,
        /// TOML type that was found instead
        found: String,
    },
}

/// Version validation errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version parsing failed
    #[error("Failed to parse version '{version}': {source}")]
    ParseFailed {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// Repository / checkout errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {path}")]
    NotRepository {
        /// Path that was opened
        path: PathBuf,
    },

    /// HEAD could not be resolved (e.g. unborn branch)
    #[error("Failed to resolve HEAD: {reason}")]
    HeadUnresolved {
        /// Reason for the error
        reason: String,
    },

    /// The git executable is not available
    #[error("git executable not found on PATH")]
    GitMissing,

    /// A git subprocess failed in a way no other variant covers
    #[error("Git command failed: {command} - {reason}")]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// stderr of the command
        reason: String,
    },
}

/// Tag creation and push errors
#[derive(Error, Debug)]
pub enum TagError {
    /// Tag already exists locally or on the remote
    #[error("Tag '{tag}' already exists")]
    Conflict {
        /// Tag name
        tag: String,
    },

    /// Remote rejected our credentials
    #[error("Authentication failed while pushing tag: {reason}")]
    Auth {
        /// Reason for the error
        reason: String,
    },

    /// Tag name is not a valid ref name
    #[error("Invalid tag name '{tag}'")]
    InvalidName {
        /// Tag name
        tag: String,
    },

    /// Local tag creation failed
    #[error("Failed to create tag '{tag}': {reason}")]
    CreateFailed {
        /// Tag name
        tag: String,
        /// Reason for the error
        reason: String,
    },

    /// Push failed for a reason other than conflict or auth
    #[error("Failed to push tag '{tag}': {reason}")]
    Push {
        /// Tag name
        tag: String,
        /// Reason for the error
        reason: String,
    },
}

/// Compilation and packaging errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// cargo is not installed
    #[error("cargo executable not found on PATH")]
    ToolchainMissing,

    /// The toolchain reported a compile failure
    #[error("Build failed for target '{target}': {reason}")]
    Build {
        /// Target triple
        target: String,
        /// Toolchain stderr
        reason: String,
    },

    /// Build succeeded but the expected binary is missing
    #[error("Compiled binary not found at {path}")]
    BinaryNotFound {
        /// Expected binary path
        path: PathBuf,
    },

    /// Archiving failed
    #[error("Failed to package {path}: {reason}")]
    Packaging {
        /// Archive path being written
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Release publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// A release for this tag already exists
    #[error("A release for tag '{tag}' already exists")]
    DuplicateRelease {
        /// Tag name
        tag: String,
    },

    /// An asset failed to upload
    #[error("Failed to upload asset '{asset}': {reason}")]
    Upload {
        /// Asset file name
        asset: String,
        /// Reason for the error
        reason: String,
    },

    /// The publisher was asked to create a release without assets
    #[error("Refusing to publish release for tag '{tag}' without assets")]
    NoAssets {
        /// Tag name
        tag: String,
    },

    /// Hosting platform rejected the token
    #[error("GitHub authentication failed: {reason}")]
    Auth {
        /// Reason for the error
        reason: String,
    },

    /// Unexpected API response
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response message
        message: String,
    },
}

/// Pipeline configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {reason}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Config file is not valid
    #[error("Invalid config {path}: {reason}")]
    Invalid {
        /// Config path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// No build targets configured
    #[error("No build targets configured")]
    NoTargets,

    /// Target triple is malformed
    #[error("Invalid target triple '{triple}'")]
    InvalidTarget {
        /// Target triple
        triple: String,
    },

    /// Repository is not in owner/repo form
    #[error("Invalid repository '{value}'. Expected: owner/repo")]
    InvalidRepository {
        /// Offending value
        value: String,
    },

    /// No GitHub token available
    #[error("GitHub token not provided. Set GH_TOKEN or GITHUB_TOKEN")]
    MissingToken,
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Manifest(ManifestError::NotFound { field, .. }) => vec![
                format!("Add '{field}' to the manifest"),
                "Pass --manifest to point at the crate's Cargo.toml".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::NotAString { .. }) => vec![
                "Workspace-inherited versions are not resolved; set an explicit version"
                    .to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository { .. }) => vec![
                "Run from inside a git checkout of the project".to_string(),
            ],
            ReleaseError::Git(GitError::GitMissing) => {
                vec!["Install git and make sure it is on PATH".to_string()]
            }
            ReleaseError::Tag(TagError::Conflict { tag }) => vec![
                format!("Bump package.version; tag '{tag}' is already taken"),
                format!("Inspect the existing tag: git show {tag}"),
            ],
            ReleaseError::Tag(TagError::Auth { .. })
            | ReleaseError::Publish(PublishError::Auth { .. })
            | ReleaseError::Config(ConfigError::MissingToken) => vec![
                "Export GH_TOKEN or GITHUB_TOKEN with 'contents: write' permission".to_string(),
                "Verify git remote URL: git remote -v".to_string(),
            ],
            ReleaseError::Build(BuildError::ToolchainMissing) => vec![
                "Install Rust via rustup: https://rustup.rs".to_string(),
            ],
            ReleaseError::Build(BuildError::Build { target, .. }) => vec![
                format!("Install the target: rustup target add {target}"),
                "Cross-compiling to windows-gnu needs the mingw-w64 linker".to_string(),
            ],
            ReleaseError::Publish(PublishError::DuplicateRelease { tag }) => vec![
                format!("Delete or rename the existing release for '{tag}'"),
            ],
            ReleaseError::Publish(PublishError::Upload { .. }) => vec![
                "The release was created; remove it before rerunning".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error indicates a naming collision with earlier releases
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ReleaseError::Tag(TagError::Conflict { .. })
                | ReleaseError::Publish(PublishError::DuplicateRelease { .. })
        )
    }
}
