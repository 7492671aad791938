//! Source checkout: locate the working tree and the commit being released.

use crate::error::{GitError, ReleaseError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};

/// The working tree the pipeline operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    /// Root of the working tree
    pub root: PathBuf,
    /// Full SHA of HEAD
    pub head_commit: String,
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
}

impl WorkspaceInfo {
    /// First 7 characters of the HEAD SHA
    pub fn short_commit(&self) -> &str {
        let end = self.head_commit.len().min(7);
        &self.head_commit[..end]
    }
}

/// Capability for materializing the repository working tree
pub trait Checkout {
    /// Resolve the working tree that contains `path`
    fn checkout(&self, path: &Path) -> impl Future<Output = Result<WorkspaceInfo>>;
}

/// Uses an existing local checkout, inspected with gix
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCheckout;

impl Checkout for LocalCheckout {
    async fn checkout(&self, path: &Path) -> Result<WorkspaceInfo> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || inspect(&path))
            .await
            .map_err(|e| ReleaseError::Anyhow(anyhow::anyhow!("checkout task failed: {e}")))?
    }
}

/// Open the repository containing `path` and describe HEAD
pub fn inspect(path: &Path) -> Result<WorkspaceInfo> {
    let repo = gix::discover(path).map_err(|e| {
        log::debug!("gix discover failed for {}: {}", path.display(), e);
        GitError::NotRepository {
            path: path.to_path_buf(),
        }
    })?;

    let root = repo
        .workdir()
        .ok_or_else(|| GitError::NotRepository {
            path: path.to_path_buf(),
        })?
        .to_path_buf();

    let head_commit = repo
        .head_id()
        .map_err(|e| GitError::HeadUnresolved {
            reason: e.to_string(),
        })?
        .to_string();

    let branch = repo
        .head_name()
        .ok()
        .flatten()
        .map(|name| name.shorten().to_string());

    Ok(WorkspaceInfo {
        root,
        head_commit,
        branch,
    })
}

/// Whether `refs/tags/<tag>` exists in the repository containing `path`
pub fn local_tag_exists(path: &Path, tag: &str) -> Result<bool> {
    let repo = gix::discover(path).map_err(|_| GitError::NotRepository {
        path: path.to_path_buf(),
    })?;

    let full_name = format!("refs/tags/{tag}");
    let reference = repo
        .try_find_reference(full_name.as_str())
        .map_err(|e| GitError::CommandFailed {
            command: format!("find reference {full_name}"),
            reason: e.to_string(),
        })?;

    Ok(reference.is_some())
}
