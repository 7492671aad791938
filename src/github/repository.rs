//! `owner/repo` identification for the hosting platform.

use crate::error::{ConfigError, Result};
use crate::git::command::run_git_checked;
use std::path::Path;
use std::str::FromStr;

/// A GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepository {
            value: value.to_string(),
        };
        let (owner, name) = value.trim().split_once('/').ok_or_else(invalid)?;
        let name = name.trim_end_matches(".git");
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Repository {
    /// Parse owner/repo out of a git remote URL
    ///
    /// Supports:
    /// - SSH SCP-like: `git@github.com:owner/repo.git`
    /// - URLs: `https://github.com/owner/repo.git`, `ssh://git@host:22/owner/repo`
    pub fn from_remote_url(remote: &str) -> Option<Self> {
        let remote = remote.trim();

        if !remote.contains("://") {
            let (_, path) = remote.split_once(':')?;
            return path.trim_matches('/').parse().ok();
        }

        let url = url::Url::parse(remote).ok()?;
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let name = segments.next()?.trim_end_matches(".git");
        if name.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// Pick the repository: explicit value, then `GITHUB_REPOSITORY`, then the remote URL
pub async fn resolve_repository(
    explicit: Option<&str>,
    env_value: Option<&str>,
    checkout: &Path,
    remote: &str,
) -> Result<Repository> {
    if let Some(value) = explicit.or(env_value) {
        return Ok(value.parse()?);
    }

    let url = run_git_checked(checkout, &["remote", "get-url", remote]).await?;
    Repository::from_remote_url(&url)
        .ok_or_else(|| ConfigError::InvalidRepository { value: url }.into())
}
