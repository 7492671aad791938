//! Minimal GitHub REST client for release operations.

use crate::error::{PublishError, ReleaseError, Result};
use crate::github::Repository;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Release object returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,
    /// Release name
    #[serde(default)]
    pub name: Option<String>,
    /// Tag name
    pub tag_name: String,
    /// Web URL
    pub html_url: String,
    /// Upload URL template (`.../assets{?name,label}`)
    pub upload_url: String,
    /// Draft flag
    #[serde(default)]
    pub draft: bool,
    /// Pre-release flag
    #[serde(default)]
    pub prerelease: bool,
    /// Attached assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Release asset returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Download URL
    pub browser_download_url: String,
}

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRelease<'a> {
    /// Tag to attach the release to
    pub tag_name: &'a str,
    /// Release name
    pub name: &'a str,
    /// Commit to create the tag from if it does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<&'a str>,
    /// Release notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
    /// Draft flag
    pub draft: bool,
    /// Pre-release flag
    pub prerelease: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
}

/// Authenticated client bound to one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    token: String,
    repo: Repository,
}

impl GitHubClient {
    /// Create a client for `repo` against `api_base`
    pub fn new(api_base: &str, token: String, repo: Repository, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| PublishError::Api {
            status: 0,
            message: format!("invalid API URL '{api_base}': {e}"),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_base,
            token,
            repo,
        })
    }

    /// Repository this client talks to
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// `<api>/repos/<owner>/<repo>/<segments...>` with each segment escaped
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| PublishError::Api {
                status: 0,
                message: format!("API URL '{}' cannot be a base", self.api_base),
            })?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Release for `tag`, or `None` when there is none
    pub async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let url = self.endpoint(&["releases", "tags", tag])?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let status = response.status();
        log::debug!("GET release by tag {tag}: {status}");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body, tag).into());
        }
        Ok(Some(response.json().await?))
    }

    /// Create a release
    pub async fn create_release(&self, release: &CreateRelease<'_>) -> Result<Release> {
        let url = self.endpoint(&["releases"])?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(release)
            .send()
            .await?;
        let status = response.status();
        log::debug!("POST release {}: {status}", release.tag_name);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body, release.tag_name).into());
        }
        Ok(response.json().await?)
    }

    /// Upload one asset to `release`
    pub async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<Asset> {
        let upload_error = |reason: String| {
            ReleaseError::from(PublishError::Upload {
                asset: name.to_string(),
                reason,
            })
        };

        let url = upload_url(&release.upload_url, name)
            .map_err(|e| upload_error(format!("invalid upload URL: {e}")))?;
        let size = content.len();

        let response = self
            .request(reqwest::Method::POST, url)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        let status = response.status();
        log::debug!("Upload {name} ({size} bytes): {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_body(&body).message;
            return Err(upload_error(format!("{status}: {message}")));
        }

        response
            .json()
            .await
            .map_err(|e| upload_error(format!("unexpected response: {e}")))
    }
}

/// Expand a release `upload_url` template for `name`
pub fn upload_url(template: &str, name: &str) -> std::result::Result<Url, url::ParseError> {
    let base = template.split('{').next().unwrap_or(template);
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("name", name);
    Ok(url)
}

fn parse_error_body(body: &str) -> ApiErrorBody {
    serde_json::from_str(body).unwrap_or_else(|_| ApiErrorBody {
        message: body.trim().to_string(),
        errors: Vec::new(),
    })
}

/// Map a non-success API response to the publish error taxonomy
pub fn api_error(status: StatusCode, body: &str, tag: &str) -> PublishError {
    let parsed = parse_error_body(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishError::Auth {
            reason: format!("{status}: {}", parsed.message),
        },
        StatusCode::UNPROCESSABLE_ENTITY
            if parsed
                .errors
                .iter()
                .any(|e| e.code.as_deref() == Some("already_exists")) =>
        {
            PublishError::DuplicateRelease {
                tag: tag.to_string(),
            }
        }
        _ => PublishError::Api {
            status: status.as_u16(),
            message: parsed.message,
        },
    }
}
