//! Build command: run the first three steps and leave the archives in `target/dist`.

use crate::cli::{MatrixArgs, RuntimeConfig};
use crate::error::Result;
use crate::git::LocalCheckout;
use crate::manifest::TomlManifestReader;
use crate::pipeline::{Pipeline, PipelineSettings};

/// Execute build command
pub(super) async fn execute_build(matrix: &MatrixArgs, config: &mut RuntimeConfig) -> Result<()> {
    matrix.apply(config.config_mut());
    config.validate()?;

    let settings = PipelineSettings::from(config.config());
    let mut pipeline = Pipeline::new(
        TomlManifestReader,
        LocalCheckout,
        super::compiler(config.config()),
        (),
        (),
        settings,
    );

    let outcome = pipeline.build(config.output()).await?;

    config.success_println(&format!(
        "Built {} archive(s) for version {}",
        outcome.archives.len(),
        outcome.version
    ));
    for archive in &outcome.archives {
        config.indent(&format!("{}  {}", archive.sha256, archive.path.display()));
    }
    Ok(())
}
