//! Release pipeline orchestration.
//!
//! Five steps run strictly in order, each gated on the previous one:
//!
//! 1. read `package.version` from the manifest
//! 2. resolve the working tree being released
//! 3. compile and package every configured target
//! 4. create and push the version tag
//! 5. create the release for that tag and attach the archives
//!
//! The first failure aborts the run; nothing is retried or rolled back.
//! The release is named after the tag the tag publisher *returns*, which may
//! differ from the version that was requested.

mod report;

pub use report::{Plan, PipelineReport, RunStatus, Step};

use crate::build::{BuildTarget, BuiltArchive, CompileRequest, Compiler};
use crate::cli::OutputManager;
use crate::config::PipelineConfig;
use crate::error::{PublishError, ReleaseError, Result, VersionError};
use crate::git::{Checkout, TagInfo, TagPublisher, WorkspaceInfo};
use crate::manifest::{ManifestReader, manifest_dir};
use crate::publish::{ReleaseInfo, ReleasePublisher, ReleaseRequest, release_name};
use std::path::{Path, PathBuf};

/// Static inputs of a run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Manifest holding `package.version`
    pub manifest: PathBuf,
    /// Build matrix
    pub targets: Vec<BuildTarget>,
    /// Tag annotation; `{tag}` and `{version}` are substituted
    pub tag_message: String,
    /// Release notes
    pub release_body: Option<String>,
    /// Create the release as a draft
    pub draft: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("Cargo.toml"),
            targets: vec![BuildTarget::default()],
            tag_message: "Release {tag}".to_string(),
            release_body: None,
            draft: false,
        }
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            manifest: config.manifest.clone(),
            targets: config.targets.clone(),
            tag_message: config.tag_message.clone(),
            release_body: config.release_body.clone(),
            draft: config.draft,
        }
    }
}

/// Tag annotation for `tag` / `version` from a template
pub fn render_tag_message(template: &str, tag: &str, version: &str) -> String {
    template.replace("{tag}", tag).replace("{version}", version)
}

/// Output of steps 1-3
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Version read from the manifest, verbatim
    pub version: String,
    /// Parsed form of `version`
    pub semver: semver::Version,
    /// Working tree that was built
    pub workspace: WorkspaceInfo,
    /// One archive per target, in matrix order
    pub archives: Vec<BuiltArchive>,
}

/// The release pipeline, generic over each external capability
pub struct Pipeline<M, K, C, T, R> {
    manifest: M,
    checkout: K,
    compiler: C,
    tagger: T,
    publisher: R,
    settings: PipelineSettings,
    status: RunStatus,
}

impl<M, K, C, T, R> Pipeline<M, K, C, T, R> {
    /// Assemble a pipeline from its capabilities
    pub fn new(
        manifest: M,
        checkout: K,
        compiler: C,
        tagger: T,
        publisher: R,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            manifest,
            checkout,
            compiler,
            tagger,
            publisher,
            settings,
            status: RunStatus::NotRun,
        }
    }

    /// Current run status
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    fn fail(&mut self, step: Step, error: ReleaseError) -> ReleaseError {
        log::error!("Step '{step}' failed: {error}");
        self.status = RunStatus::Failed { step };
        error
    }
}

impl<M, K, C, T, R> Pipeline<M, K, C, T, R>
where
    M: ManifestReader,
{
    fn read_version(&self) -> Result<(String, semver::Version)> {
        let version = self.manifest.read_version(&self.settings.manifest)?;
        let parsed = semver::Version::parse(&version).map_err(|source| {
            VersionError::ParseFailed {
                version: version.clone(),
                source,
            }
        })?;
        Ok((version, parsed))
    }

    /// Describe what a run would do without side effects
    pub fn plan(&self) -> Result<Plan>
    where
        T: TagPublisher,
    {
        let (version, _) = self.read_version()?;
        let binary = self.manifest.binary_name(&self.settings.manifest)?;
        let tag = self.tagger.tag_name(&version);
        Ok(Plan {
            release_name: release_name(&tag),
            archives: self
                .settings
                .targets
                .iter()
                .map(|t| t.archive_file_name(&binary, &version))
                .collect(),
            version,
            tag,
        })
    }
}

impl<M, K, C, T, R> Pipeline<M, K, C, T, R>
where
    M: ManifestReader,
    K: Checkout,
    C: Compiler,
{
    /// Run steps 1-3: read the version, resolve the checkout, build every target
    pub async fn build(&mut self, output: &OutputManager) -> Result<BuildOutcome> {
        self.status = RunStatus::Running {
            step: Step::ReadManifest,
        };

        // Step 1
        let _ = output.section("Manifest");
        let (version, semver) = match self.read_version() {
            Ok(v) => v,
            Err(e) => return Err(self.fail(Step::ReadManifest, e)),
        };
        let binary = match self.manifest.binary_name(&self.settings.manifest) {
            Ok(b) => b,
            Err(e) => return Err(self.fail(Step::ReadManifest, e)),
        };
        let _ = output.success(&format!("Version {version} ({binary})"));

        // Step 2
        self.status = RunStatus::Running {
            step: Step::Checkout,
        };
        let project_dir = manifest_dir(&self.settings.manifest);
        let workspace = match self.checkout.checkout(&project_dir).await {
            Ok(w) => w,
            Err(e) => return Err(self.fail(Step::Checkout, e)),
        };
        let _ = output.success(&format!(
            "Checkout {} at {}",
            workspace.root.display(),
            workspace.short_commit()
        ));

        // Step 3
        self.status = RunStatus::Running { step: Step::Compile };
        let _ = output.section("Build");
        let archives = match self
            .compile_all(output, &project_dir, &binary, &version)
            .await
        {
            Ok(archives) => archives,
            Err(e) => return Err(self.fail(Step::Compile, e)),
        };

        Ok(BuildOutcome {
            version,
            semver,
            workspace,
            archives,
        })
    }

    async fn compile_all(
        &self,
        output: &OutputManager,
        project_dir: &Path,
        binary: &str,
        version: &str,
    ) -> Result<Vec<BuiltArchive>> {
        let mut archives = Vec::with_capacity(self.settings.targets.len());
        for target in &self.settings.targets {
            let _ = output.progress(&format!("Compiling {} ({})", target.triple, target.archive));
            let request = CompileRequest {
                target,
                project_dir,
                binary_name: binary,
                version,
            };
            let archive = self.compiler.compile(request).await?;
            let _ = output.success(&format!("Packaged {}", archive.path.display()));
            archives.push(archive);
        }
        Ok(archives)
    }
}

impl<M, K, C, T, R> Pipeline<M, K, C, T, R>
where
    M: ManifestReader,
    K: Checkout,
    C: Compiler,
    T: TagPublisher,
    R: ReleasePublisher,
{
    /// Run all five steps
    pub async fn run(&mut self, output: &OutputManager) -> Result<PipelineReport> {
        let started_at = chrono::Utc::now();
        let run_id = uuid::Uuid::new_v4();
        log::info!("Starting release run {run_id}");

        let outcome = self.build(output).await?;

        // Step 4
        self.status = RunStatus::Running {
            step: Step::PublishTag,
        };
        let _ = output.section("Tag");
        let tag = match self.publish_tag(&outcome.version).await {
            Ok(tag) => tag,
            Err(e) => return Err(self.fail(Step::PublishTag, e)),
        };
        let _ = output.success(&format!("Pushed tag {} to {}", tag.name, tag.remote));

        // Step 5
        self.status = RunStatus::Running {
            step: Step::PublishRelease,
        };
        let _ = output.section("Release");
        let release = match self.publish_release(&outcome, &tag).await {
            Ok(release) => release,
            Err(e) => return Err(self.fail(Step::PublishRelease, e)),
        };
        let _ = output.success(&format!("Published {}: {}", release.name, release.html_url));
        for asset in &release.assets {
            let _ = output.indent(&format!("{} ({} bytes)", asset.name, asset.size));
        }

        self.status = RunStatus::Succeeded;
        log::info!("Release run {run_id} succeeded");

        Ok(PipelineReport {
            run_id: run_id.to_string(),
            version: outcome.version,
            tag,
            release,
            archives: outcome.archives,
            started_at,
            finished_at: chrono::Utc::now(),
        })
    }

    async fn publish_tag(&self, version: &str) -> Result<TagInfo> {
        let planned = self.tagger.tag_name(version);
        let message = render_tag_message(&self.settings.tag_message, &planned, version);
        self.tagger.publish_tag(version, &message).await
    }

    async fn publish_release(&self, outcome: &BuildOutcome, tag: &TagInfo) -> Result<ReleaseInfo> {
        let assets: Vec<PathBuf> = outcome
            .archives
            .iter()
            .flat_map(BuiltArchive::release_assets)
            .collect();
        if assets.is_empty() {
            return Err(PublishError::NoAssets {
                tag: tag.name.clone(),
            }
            .into());
        }

        let request = ReleaseRequest {
            body: self.settings.release_body.clone(),
            target_commitish: Some(tag.target_commit.clone()),
            draft: self.settings.draft,
            prerelease: !outcome.semver.pre.is_empty(),
            ..ReleaseRequest::for_tag(tag.name.clone(), assets)
        };
        self.publisher.publish_release(&request).await
    }
}
