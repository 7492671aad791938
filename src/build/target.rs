//! Build target descriptors: what to compile and how to package it.

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Target built when no configuration overrides it
pub const DEFAULT_TRIPLE: &str = "x86_64-pc-windows-gnu";

/// Toolchain channel used when none is configured
pub const DEFAULT_TOOLCHAIN: &str = "stable";

static TRIPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_]+(-[a-z0-9_.]+){2,3}$").expect("target triple regex is valid")
});

/// Archive format for a packaged binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveFormat {
    /// `.zip` (default, the usual choice for Windows targets)
    #[default]
    #[serde(rename = "zip")]
    Zip,
    /// gzip-compressed tarball
    #[serde(rename = "tar.gz", alias = "tgz")]
    TarGz,
}

impl ArchiveFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            other => Err(format!("unknown archive format '{other}' (expected zip or tar.gz)")),
        }
    }
}

/// Whether the compile step hands extra artifacts to the release step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Only the archive is attached to the release
    #[default]
    None,
    /// The archive and its `.sha256` checksum file are attached
    Release,
}

/// One entry of the build matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Rust target triple, e.g. `x86_64-pc-windows-gnu`
    pub triple: String,
    /// Archive format for the packaged binary
    #[serde(default)]
    pub archive: ArchiveFormat,
    /// rustup toolchain channel; empty means whatever `cargo` resolves to
    #[serde(default = "default_toolchain")]
    pub toolchain: String,
    /// Upload behavior of the compile step
    #[serde(default)]
    pub upload: UploadMode,
}

fn default_toolchain() -> String {
    DEFAULT_TOOLCHAIN.to_string()
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self {
            triple: DEFAULT_TRIPLE.to_string(),
            archive: ArchiveFormat::Zip,
            toolchain: default_toolchain(),
            upload: UploadMode::None,
        }
    }
}

impl BuildTarget {
    /// Create a target with default archive format and toolchain
    pub fn new(triple: impl Into<String>) -> Self {
        Self {
            triple: triple.into(),
            ..Self::default()
        }
    }

    /// Check that the triple looks like `arch-vendor-os[-abi]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if TRIPLE_RE.is_match(&self.triple) {
            Ok(())
        } else {
            Err(ConfigError::InvalidTarget {
                triple: self.triple.clone(),
            })
        }
    }

    /// Whether binaries for this target carry an `.exe` suffix
    pub fn is_windows(&self) -> bool {
        self.triple.contains("-windows")
    }

    /// File name of the compiled binary for this target
    pub fn binary_file_name(&self, binary_name: &str) -> String {
        if self.is_windows() {
            format!("{binary_name}.exe")
        } else {
            binary_name.to_string()
        }
    }

    /// File name of the archive: `<bin>_<version>_<triple>.<ext>`
    pub fn archive_file_name(&self, binary_name: &str, version: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            binary_name,
            version,
            self.triple,
            self.archive.extension()
        )
    }
}
