//! # Release Pipeline
//!
//! Manifest-driven release automation for a single Rust binary.
//!
//! A run reads `package.version` from the crate's manifest, builds the binary
//! for every configured target, pushes a tag named after the version and
//! creates a GitHub release with the packaged archives attached. Each step
//! only starts once the previous one succeeded.
//!
//! ## Features
//!
//! - **Single source of truth**: the version comes verbatim from `Cargo.toml`
//! - **Cross builds**: `x86_64-pc-windows-gnu` by default, any triple via config
//! - **Conflict-safe tagging**: an existing tag aborts before anything is published
//! - **Pluggable steps**: every external system sits behind a trait
//!
//! ## Usage
//!
//! ```bash
//! release_pipeline                    # full release
//! release_pipeline preview            # show tag, release and archive names
//! release_pipeline build --target x86_64-unknown-linux-musl
//! release_pipeline version            # print package.version
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod manifest;
pub mod pipeline;
pub mod publish;

pub use build::{BuildTarget, BuiltArchive, CargoCompiler, CompileRequest, Compiler};
pub use cli::Args;
pub use config::{EnvConfig, PipelineConfig};
pub use error::{ReleaseError, Result};
pub use git::{Checkout, GitTagPublisher, LocalCheckout, TagInfo, TagPublisher, WorkspaceInfo};
pub use github::GitHubReleasePublisher;
pub use manifest::{ManifestReader, TomlManifestReader};
pub use pipeline::{Pipeline, PipelineReport, PipelineSettings, RunStatus, Step};
pub use publish::{ReleaseInfo, ReleasePublisher, ReleaseRequest};
