//! GitHub integration for release operations

pub mod client;
mod release_manager;
mod repository;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use release_manager::GitHubReleasePublisher;
pub use repository::{Repository, resolve_repository};
