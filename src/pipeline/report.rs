//! Run state and the records a pipeline run produces.

use crate::build::BuiltArchive;
use crate::git::TagInfo;
use crate::publish::ReleaseInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Pipeline steps in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Read the version from the manifest
    ReadManifest,
    /// Resolve the working tree
    Checkout,
    /// Build and package targets
    Compile,
    /// Create and push the tag
    PublishTag,
    /// Create the release and upload assets
    PublishRelease,
}

impl Step {
    /// All steps, in order
    pub const ALL: [Step; 5] = [
        Step::ReadManifest,
        Step::Checkout,
        Step::Compile,
        Step::PublishTag,
        Step::PublishRelease,
    ];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ReadManifest => "manifest",
            Step::Checkout => "checkout",
            Step::Compile => "compile",
            Step::PublishTag => "tag",
            Step::PublishRelease => "release",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Not started
    NotRun,
    /// Executing `step`
    Running {
        /// Current step
        step: Step,
    },
    /// All steps completed
    Succeeded,
    /// Aborted at `step`
    Failed {
        /// Step that failed
        step: Step,
    },
}

impl RunStatus {
    /// Whether the run has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed { .. })
    }
}

/// What a run would produce, computed without side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Manifest version
    pub version: String,
    /// Tag that would be created
    pub tag: String,
    /// Release that would be created
    pub release_name: String,
    /// Archive file names, one per target
    pub archives: Vec<String>,
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Unique ID of this run
    pub run_id: String,
    /// Manifest version
    pub version: String,
    /// Pushed tag
    pub tag: TagInfo,
    /// Created release
    pub release: ReleaseInfo,
    /// Archives built, in matrix order
    pub archives: Vec<BuiltArchive>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub finished_at: DateTime<Utc>,
}

impl PipelineReport {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
