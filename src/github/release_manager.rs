//! GitHub implementation of [`ReleasePublisher`].

use crate::error::{PublishError, Result};
use crate::github::client::{CreateRelease, GitHubClient};
use crate::publish::{ReleaseInfo, ReleasePublisher, ReleaseRequest, UploadedAsset, content_type};
use bytes::Bytes;

/// Publishes releases through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubReleasePublisher {
    client: GitHubClient,
}

impl GitHubReleasePublisher {
    /// Create a publisher around an authenticated client
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Check the request before anything is created remotely
    fn preflight(request: &ReleaseRequest) -> Result<()> {
        if request.assets.is_empty() {
            return Err(PublishError::NoAssets {
                tag: request.tag.clone(),
            }
            .into());
        }

        for asset in &request.assets {
            if !asset.is_file() {
                return Err(PublishError::Upload {
                    asset: asset.display().to_string(),
                    reason: "file not found".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl ReleasePublisher for GitHubReleasePublisher {
    async fn publish_release(&self, request: &ReleaseRequest) -> Result<ReleaseInfo> {
        Self::preflight(request)?;

        if self.client.release_by_tag(&request.tag).await?.is_some() {
            return Err(PublishError::DuplicateRelease {
                tag: request.tag.clone(),
            }
            .into());
        }

        let release = self
            .client
            .create_release(&CreateRelease {
                tag_name: &request.tag,
                name: &request.name,
                target_commitish: request.target_commitish.as_deref(),
                body: request.body.as_deref(),
                draft: request.draft,
                prerelease: request.prerelease,
            })
            .await?;
        log::info!(
            "Created release '{}' for {} in {}: {}",
            request.name,
            request.tag,
            self.client.repository(),
            release.html_url
        );

        let mut assets = Vec::with_capacity(request.assets.len());
        for path in &request.assets {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| PublishError::Upload {
                    asset: path.display().to_string(),
                    reason: "invalid file name".to_string(),
                })?;

            let content = tokio::fs::read(path)
                .await
                .map_err(|e| PublishError::Upload {
                    asset: file_name.to_string(),
                    reason: e.to_string(),
                })?;

            let asset = self
                .client
                .upload_asset(&release, file_name, content_type(path), Bytes::from(content))
                .await?;
            log::info!("Uploaded {} ({} bytes)", asset.name, asset.size);

            assets.push(UploadedAsset {
                name: asset.name,
                size: asset.size,
                download_url: asset.browser_download_url,
            });
        }

        Ok(ReleaseInfo {
            id: release.id,
            name: release.name.unwrap_or_else(|| request.name.clone()),
            tag: release.tag_name,
            html_url: release.html_url,
            assets,
        })
    }
}
