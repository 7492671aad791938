//! Compiler invocation: build a release binary per target and package it.

pub mod archive;
mod cargo;
mod target;

pub use archive::ArchiveEntry;
pub use cargo::CargoCompiler;
pub use target::{ArchiveFormat, BuildTarget, DEFAULT_TOOLCHAIN, DEFAULT_TRIPLE, UploadMode};

use crate::error::Result;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Inputs for compiling one matrix entry
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Target to build
    pub target: &'a BuildTarget,
    /// Directory containing the crate's Cargo.toml
    pub project_dir: &'a Path,
    /// Name of the binary to package
    pub binary_name: &'a str,
    /// Version string used in the archive name
    pub version: &'a str,
}

/// A packaged build output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltArchive {
    /// Target triple the archive was built for
    pub target: String,
    /// Archive on disk
    pub path: PathBuf,
    /// `.sha256` file next to the archive
    pub checksum_path: PathBuf,
    /// SHA-256 of the archive
    pub sha256: String,
    /// Upload mode inherited from the target
    pub upload: UploadMode,
}

impl BuiltArchive {
    /// Files the release step should attach for this archive
    pub fn release_assets(&self) -> Vec<PathBuf> {
        match self.upload {
            UploadMode::None => vec![self.path.clone()],
            UploadMode::Release => vec![self.path.clone(), self.checksum_path.clone()],
        }
    }
}

/// Capability for turning a target descriptor into a distributable archive
pub trait Compiler {
    /// Build and package one target, returning the archive
    fn compile(&self, request: CompileRequest<'_>) -> impl Future<Output = Result<BuiltArchive>>;
}
