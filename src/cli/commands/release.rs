//! Release command: the full five-step pipeline against GitHub.

use crate::cli::{ReleaseArgs, RuntimeConfig};
use crate::error::{ConfigError, Result};
use crate::git::command::run_git;
use crate::git::{GitTagPublisher, LocalCheckout};
use crate::github::{GitHubClient, GitHubReleasePublisher, resolve_repository};
use crate::manifest::{TomlManifestReader, manifest_dir};
use crate::pipeline::{Pipeline, PipelineSettings};
use std::path::Path;
use std::time::Duration;

/// Execute release command
pub(super) async fn execute_release(release: &ReleaseArgs, config: &mut RuntimeConfig) -> Result<()> {
    release.matrix.apply(config.config_mut());
    {
        let settings = config.config_mut();
        if let Some(prefix) = &release.tag_prefix {
            settings.tag_prefix = prefix.clone();
        }
        if let Some(remote) = &release.remote {
            settings.remote = remote.clone();
        }
        if let Some(repo) = &release.repo {
            settings.repository = Some(repo.clone());
        }
        settings.draft |= release.draft;
    }
    config.validate()?;

    let token = config
        .env()
        .github_token()
        .ok_or(ConfigError::MissingToken)?;
    let settings = config.config().clone();
    let project_dir = manifest_dir(&settings.manifest);

    warn_if_dirty(config, &project_dir).await;

    let env_repository = config.env().github_repository();
    let repository = resolve_repository(
        settings.repository.as_deref(),
        env_repository.as_deref(),
        &project_dir,
        &settings.remote,
    )
    .await?;
    let _ = config
        .output()
        .verbose(&format!("Publishing to {repository} via {}", settings.remote));

    let client = GitHubClient::new(
        &config.env().github_api_url(),
        token.clone(),
        repository,
        Duration::from_secs(settings.http_timeout_secs),
    )?;
    let tagger = GitTagPublisher::new(&project_dir)
        .with_remote(settings.remote.clone())
        .with_prefix(settings.tag_prefix.clone())
        .with_token(Some(token));

    let mut pipeline = Pipeline::new(
        TomlManifestReader,
        LocalCheckout,
        super::compiler(&settings),
        tagger,
        GitHubReleasePublisher::new(client),
        PipelineSettings::from(&settings),
    );

    let report = pipeline.run(config.output()).await?;

    if release.json {
        config.output().data(&serde_json::to_string_pretty(&report)?)?;
    } else {
        let seconds = report.duration().num_milliseconds() as f64 / 1000.0;
        config.println("");
        config.success_println(&format!(
            "Released {} as '{}' in {seconds:.1}s",
            report.tag.name, report.release.name
        ));
        config.indent(&report.release.html_url);
    }
    Ok(())
}

async fn warn_if_dirty(config: &RuntimeConfig, project_dir: &Path) {
    match run_git(project_dir, &["status", "--porcelain"], None).await {
        Ok(status) if status.success && !status.stdout.is_empty() => {
            config.warning_println("Working directory has uncommitted changes");
            config.warning_println("They end up in the archives but not in the tagged commit");
        }
        Ok(_) => {}
        Err(e) => log::debug!("Skipping dirty check: {e}"),
    }
}
