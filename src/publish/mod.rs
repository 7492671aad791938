//! Release publishing capability.
//!
//! Defines what the pipeline needs from a hosting platform: create one release
//! for a tag and attach files to it. The GitHub implementation lives in
//! [`crate::github`].

use crate::error::Result;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Everything needed to create a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Tag the release references
    pub tag: String,
    /// Human-readable release name
    pub name: String,
    /// Release notes
    pub body: Option<String>,
    /// Commit the tag points at (informational for platforms that need it)
    pub target_commitish: Option<String>,
    /// Create as draft
    pub draft: bool,
    /// Mark as pre-release
    pub prerelease: bool,
    /// Local files to attach
    pub assets: Vec<PathBuf>,
}

impl ReleaseRequest {
    /// Request for `tag` named `"Release <tag>"`
    pub fn for_tag(tag: impl Into<String>, assets: Vec<PathBuf>) -> Self {
        let tag = tag.into();
        Self {
            name: release_name(&tag),
            tag,
            body: None,
            target_commitish: None,
            draft: false,
            prerelease: false,
            assets,
        }
    }
}

/// An attached asset as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedAsset {
    /// Asset file name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Public download URL
    pub download_url: String,
}

/// A created release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    /// Platform release ID
    pub id: u64,
    /// Release name
    pub name: String,
    /// Tag the release references
    pub tag: String,
    /// Web URL of the release
    pub html_url: String,
    /// Uploaded assets, in upload order
    pub assets: Vec<UploadedAsset>,
}

/// Capability for creating a hosted release with attached assets
pub trait ReleasePublisher {
    /// Create the release and upload every asset; partial uploads are not rolled back
    fn publish_release(&self, request: &ReleaseRequest) -> impl Future<Output = Result<ReleaseInfo>>;
}

/// Release name for a tag
pub fn release_name(tag: &str) -> String {
    format!("Release {tag}")
}

/// MIME type for an asset based on its extension
pub fn content_type(path: &Path) -> &'static str {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return "application/gzip";
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("zip") => "application/zip",
        Some("exe") => "application/x-msdownload",
        Some("gz") => "application/gzip",
        Some("sha256") | Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_is_named_after_tag() {
        let request = ReleaseRequest::for_tag("2.0.0", vec![PathBuf::from("a.zip")]);
        assert_eq!(request.name, "Release 2.0.0");
        assert_eq!(request.tag, "2.0.0");
        assert!(!request.draft);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type(Path::new("t_2.0.0_x86_64-pc-windows-gnu.zip")), "application/zip");
        assert_eq!(content_type(Path::new("t.tar.gz")), "application/gzip");
        assert_eq!(content_type(Path::new("t.zip.sha256")), "text/plain");
        assert_eq!(content_type(Path::new("t")), "application/octet-stream");
    }
}
