//! Tag publisher: create an annotated tag at HEAD and push it.

use crate::error::{ReleaseError, Result, TagError};
use crate::git::command::{is_auth_failure, run_git, run_git_checked};
use crate::git::workspace::local_tag_exists;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;

/// A tag that was created and pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    /// Final tag name (authoritative for later steps)
    pub name: String,
    /// Commit the tag points at
    pub target_commit: String,
    /// Annotation message
    pub message: String,
    /// Remote the tag was pushed to
    pub remote: String,
}

/// Capability for creating a version tag in the remote's tag namespace
pub trait TagPublisher {
    /// Name that [`TagPublisher::publish_tag`] will create for `requested`
    fn tag_name(&self, requested: &str) -> String {
        requested.to_string()
    }

    /// Create `requested` (possibly adjusted) at the current commit and push it
    fn publish_tag(&self, requested: &str, message: &str) -> impl Future<Output = Result<TagInfo>>;
}

/// Publishes tags with the system git against a local checkout
#[derive(Debug, Clone)]
pub struct GitTagPublisher {
    repo: PathBuf,
    remote: String,
    prefix: String,
    token: Option<String>,
}

impl GitTagPublisher {
    /// Publisher for the repository at `repo`, pushing to `origin` without a prefix
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            remote: "origin".to_string(),
            prefix: String::new(),
            token: None,
        }
    }

    /// Push to a different remote
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Prefix prepended to requested names that don't already carry it (e.g. `v`)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Token sent as HTTP credentials on remote operations
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn ensure_valid_name(&self, tag: &str) -> Result<()> {
        let full_name = format!("refs/tags/{tag}");
        let output = run_git(&self.repo, &["check-ref-format", &full_name], None).await?;
        if output.success {
            Ok(())
        } else {
            Err(TagError::InvalidName {
                tag: tag.to_string(),
            }
            .into())
        }
    }

    async fn exists_locally(&self, tag: &str) -> Result<bool> {
        let repo = self.repo.clone();
        let tag = tag.to_string();
        tokio::task::spawn_blocking(move || local_tag_exists(&repo, &tag))
            .await
            .map_err(|e| ReleaseError::Anyhow(anyhow::anyhow!("tag lookup task failed: {e}")))?
    }

    async fn exists_on_remote(&self, tag: &str) -> Result<bool> {
        let full_name = format!("refs/tags/{tag}");
        let output = run_git(
            &self.repo,
            &["ls-remote", "--tags", &self.remote, &full_name],
            self.token.as_deref(),
        )
        .await?;

        if !output.success {
            return Err(classify_push_failure(tag, &output.stderr).into());
        }
        Ok(!output.stdout.is_empty())
    }

    async fn delete_local(&self, tag: &str) {
        match run_git(&self.repo, &["tag", "-d", tag], None).await {
            Ok(output) if output.success => log::debug!("Removed local tag {tag}"),
            Ok(output) => log::warn!("Failed to remove local tag {tag}: {}", output.stderr),
            Err(e) => log::warn!("Failed to remove local tag {tag}: {e}"),
        }
    }
}

impl TagPublisher for GitTagPublisher {
    fn tag_name(&self, requested: &str) -> String {
        prefixed(&self.prefix, requested)
    }

    async fn publish_tag(&self, requested: &str, message: &str) -> Result<TagInfo> {
        let name = self.tag_name(requested);
        if name != requested {
            log::info!("Tag '{requested}' will be created as '{name}'");
        }

        self.ensure_valid_name(&name).await?;

        if self.exists_locally(&name).await? || self.exists_on_remote(&name).await? {
            return Err(TagError::Conflict { tag: name }.into());
        }

        let target_commit = run_git_checked(&self.repo, &["rev-parse", "HEAD"]).await?;

        let created = run_git(&self.repo, &["tag", "-a", &name, "-m", message], None).await?;
        if !created.success {
            return Err(if created.stderr.contains("already exists") {
                TagError::Conflict { tag: name }
            } else {
                TagError::CreateFailed {
                    tag: name,
                    reason: created.stderr,
                }
            }
            .into());
        }

        let refspec = format!("refs/tags/{name}");
        let pushed = run_git(
            &self.repo,
            &["push", &self.remote, &refspec],
            self.token.as_deref(),
        )
        .await?;
        if !pushed.success {
            self.delete_local(&name).await;
            return Err(classify_push_failure(&name, &pushed.stderr).into());
        }

        log::info!("Pushed tag {name} ({target_commit}) to {}", self.remote);

        Ok(TagInfo {
            name,
            target_commit,
            message: message.to_string(),
            remote: self.remote.clone(),
        })
    }
}

/// Prepend `prefix` unless `requested` already starts with it
pub fn prefixed(prefix: &str, requested: &str) -> String {
    if requested.starts_with(prefix) {
        requested.to_string()
    } else {
        format!("{prefix}{requested}")
    }
}

/// Map a failed push/ls-remote to the tag error taxonomy
pub fn classify_push_failure(tag: &str, stderr: &str) -> TagError {
    if stderr.contains("already exists") || stderr.contains("[rejected]") {
        TagError::Conflict {
            tag: tag.to_string(),
        }
    } else if is_auth_failure(stderr) {
        TagError::Auth {
            reason: stderr.to_string(),
        }
    } else {
        TagError::Push {
            tag: tag.to_string(),
            reason: stderr.to_string(),
        }
    }
}
