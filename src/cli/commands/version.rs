//! Version command: print `package.version` as read by the manifest step.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::manifest::{ManifestReader, TomlManifestReader};

/// Execute version command
pub(super) fn execute_version(config: &RuntimeConfig) -> Result<()> {
    let version = TomlManifestReader.read_version(config.manifest())?;
    config.output().data(&version)?;
    Ok(())
}
