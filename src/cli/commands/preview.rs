//! Preview command: show what a release would create without touching anything.

use crate::cli::{MatrixArgs, RuntimeConfig};
use crate::error::Result;
use crate::git::GitTagPublisher;
use crate::manifest::{ManifestReader, TomlManifestReader, manifest_dir};
use crate::pipeline::{Pipeline, PipelineSettings};

/// Execute preview command
pub(super) fn execute_preview(
    matrix: &MatrixArgs,
    tag_prefix: Option<&str>,
    config: &mut RuntimeConfig,
) -> Result<()> {
    matrix.apply(config.config_mut());
    if let Some(prefix) = tag_prefix {
        config.config_mut().tag_prefix = prefix.to_string();
    }
    config.validate()?;

    let pipeline_config = config.config();
    let tagger = GitTagPublisher::new(manifest_dir(&pipeline_config.manifest))
        .with_prefix(pipeline_config.tag_prefix.clone());
    let pipeline = Pipeline::new(
        TomlManifestReader,
        (),
        (),
        tagger,
        (),
        PipelineSettings::from(pipeline_config),
    );

    let plan = pipeline.plan()?;
    let package = TomlManifestReader.package_name(&pipeline_config.manifest)?;

    config.println(&format!("Package:  {package}"));
    config.println(&format!("Version:  {}", plan.version));
    config.println(&format!("Tag:      {}", plan.tag));
    config.println(&format!("Release:  {}", plan.release_name));
    config.println("Archives:");
    for archive in &plan.archives {
        config.indent(archive);
    }
    Ok(())
}
