//! Cargo-backed [`Compiler`] implementation.

use crate::build::archive::{self, ArchiveEntry};
use crate::build::{BuiltArchive, CompileRequest, Compiler};
use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Builds with `cargo build --release --target <triple>` and packages the result
#[derive(Debug, Clone, Default)]
pub struct CargoCompiler {
    /// Override for cargo's target directory (defaults to `<project>/target`)
    target_dir: Option<PathBuf>,
    /// Files added next to the binary in every archive, relative to the project dir
    extra_files: Vec<PathBuf>,
    /// Cargo executable; looked up on PATH when unset
    cargo: Option<PathBuf>,
}

impl CargoCompiler {
    /// Create a compiler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific cargo target directory
    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Include additional files (README, LICENSE, ...) in every archive
    pub fn with_extra_files(mut self, files: Vec<PathBuf>) -> Self {
        self.extra_files = files;
        self
    }

    /// Use a specific cargo executable instead of the one on PATH
    pub fn with_cargo(mut self, cargo: impl Into<PathBuf>) -> Self {
        self.cargo = Some(cargo.into());
        self
    }

    fn target_dir(&self, project_dir: &Path) -> PathBuf {
        match &self.target_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.join("target"),
        }
    }

    async fn cargo_build(&self, request: &CompileRequest<'_>, target_dir: &Path) -> Result<()> {
        let cargo = match &self.cargo {
            Some(cargo) => cargo.clone(),
            None => which::which("cargo").map_err(|_| BuildError::ToolchainMissing)?,
        };
        let triple = request.target.triple.as_str();

        let mut cmd = Command::new(&cargo);
        if !request.target.toolchain.is_empty() {
            cmd.arg(format!("+{}", request.target.toolchain));
        }
        cmd.args(["build", "--release", "--target", triple])
            .arg("--target-dir")
            .arg(target_dir)
            .current_dir(request.project_dir)
            .kill_on_drop(true);

        log::info!(
            "Building {} for {} (toolchain: {})",
            request.binary_name,
            triple,
            if request.target.toolchain.is_empty() {
                "default"
            } else {
                request.target.toolchain.as_str()
            }
        );
        log::debug!("Running {:?}", cmd.as_std());

        let output = cmd.output().await.map_err(|e| BuildError::Build {
            target: triple.to_string(),
            reason: format!("failed to spawn {}: {}", cargo.display(), e),
        })?;

        if !output.status.success() {
            return Err(BuildError::Build {
                target: triple.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn archive_entries(&self, binary: &Path, binary_file: &str, project_dir: &Path) -> Vec<ArchiveEntry> {
        let mut entries = vec![ArchiveEntry {
            source: binary.to_path_buf(),
            name: binary_file.to_string(),
            executable: true,
        }];

        for extra in &self.extra_files {
            let source = project_dir.join(extra);
            let Some(name) = extra.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping extra file without a name: {}", extra.display());
                continue;
            };
            entries.push(ArchiveEntry {
                source,
                name: name.to_string(),
                executable: false,
            });
        }

        entries
    }
}

impl Compiler for CargoCompiler {
    async fn compile(&self, request: CompileRequest<'_>) -> Result<BuiltArchive> {
        let target_dir = self.target_dir(request.project_dir);
        self.cargo_build(&request, &target_dir).await?;

        let binary_file = request.target.binary_file_name(request.binary_name);
        let binary = target_dir
            .join(&request.target.triple)
            .join("release")
            .join(&binary_file);
        if !binary.is_file() {
            return Err(BuildError::BinaryNotFound { path: binary }.into());
        }

        let archive_path = target_dir
            .join("dist")
            .join(request.target.archive_file_name(request.binary_name, request.version));
        let entries = self.archive_entries(&binary, &binary_file, request.project_dir);
        let format = request.target.archive;

        let dest = archive_path.clone();
        let (checksum_path, sha256) = tokio::task::spawn_blocking(move || {
            archive::package(format, &dest, &entries)?;
            archive::write_checksum(&dest)
        })
        .await
        .map_err(|e| BuildError::Packaging {
            path: archive_path.clone(),
            reason: format!("packaging task failed: {e}"),
        })?
        .map_err(|e| BuildError::Packaging {
            path: archive_path.clone(),
            reason: format!("{e:#}"),
        })?;

        log::info!("Packaged {} (sha256 {})", archive_path.display(), sha256);

        Ok(BuiltArchive {
            target: request.target.triple.clone(),
            path: archive_path,
            checksum_path,
            sha256,
            upload: request.target.upload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::build::{BuildTarget, UploadMode};

    #[test]
    fn target_dir_resolution() {
        let project = Path::new("/work/app");
        assert_eq!(
            CargoCompiler::new().target_dir(project),
            PathBuf::from("/work/app/target")
        );
        assert_eq!(
            CargoCompiler::new().with_target_dir("out").target_dir(project),
            PathBuf::from("/work/app/out")
        );
        assert_eq!(
            CargoCompiler::new()
                .with_target_dir("/tmp/shared")
                .target_dir(project),
            PathBuf::from("/tmp/shared")
        );
    }

    #[test]
    fn extra_files_are_packaged_by_file_name() {
        let compiler = CargoCompiler::new()
            .with_extra_files(vec![PathBuf::from("README.md"), PathBuf::from("docs/LICENSE")]);
        let entries = compiler.archive_entries(
            Path::new("/t/release/tool.exe"),
            "tool.exe",
            Path::new("/work/app"),
        );

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["tool.exe", "README.md", "LICENSE"]);
        assert!(entries[0].executable);
        assert_eq!(entries[2].source, PathBuf::from("/work/app/docs/LICENSE"));
    }

    #[cfg(unix)]
    fn fake_cargo(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let cargo = dir.join("cargo");
        std::fs::write(&cargo, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&cargo, std::fs::Permissions::from_mode(0o755)).unwrap();
        cargo
    }

    #[cfg(unix)]
    async fn compile_with(cargo: PathBuf, project: &Path) -> Result<BuiltArchive> {
        let target = BuildTarget::new(crate::build::DEFAULT_TRIPLE);
        CargoCompiler::new()
            .with_cargo(cargo)
            .with_extra_files(vec![PathBuf::from("README.md")])
            .compile(CompileRequest {
                target: &target,
                project_dir: project,
                binary_name: "tool",
                version: "2.0.0",
            })
            .await
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_build_is_zipped_with_checksum() {
        use std::io::Read;

        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("README.md"), "# tool\n").unwrap();
        let cargo = fake_cargo(
            bin.path(),
            r#"while [ $# -gt 0 ]; do
  case "$1" in
    --target) triple="$2"; shift ;;
    --target-dir) dir="$2"; shift ;;
  esac
  shift
done
mkdir -p "$dir/$triple/release"
printf 'MZ fake binary' > "$dir/$triple/release/tool.exe"
"#,
        );

        let built = compile_with(cargo, project.path()).await.unwrap();

        assert_eq!(
            built.path,
            project
                .path()
                .join("target/dist/tool_2.0.0_x86_64-pc-windows-gnu.zip")
        );
        assert_eq!(built.target, "x86_64-pc-windows-gnu");
        assert_eq!(built.upload, UploadMode::None);

        let checksum = std::fs::read_to_string(&built.checksum_path).unwrap();
        assert_eq!(
            checksum,
            format!("{}  tool_2.0.0_x86_64-pc-windows-gnu.zip\n", built.sha256)
        );

        let mut zip = zip::ZipArchive::new(std::fs::File::open(&built.path).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        let mut content = String::new();
        zip.by_name("tool.exe")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "MZ fake binary");
        assert!(zip.by_name("README.md").is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cargo_failure_carries_stderr() {
        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let cargo = fake_cargo(
            bin.path(),
            "echo 'error: linker `x86_64-w64-mingw32-gcc` not found' >&2\nexit 101\n",
        );

        let err = compile_with(cargo, project.path()).await.unwrap_err();
        match err {
            crate::ReleaseError::Build(BuildError::Build { target, reason }) => {
                assert_eq!(target, "x86_64-pc-windows-gnu");
                assert!(reason.contains("x86_64-w64-mingw32-gcc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_binary_after_build_is_reported() {
        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let cargo = fake_cargo(bin.path(), "exit 0\n");

        let err = compile_with(cargo, project.path()).await.unwrap_err();
        match err {
            crate::ReleaseError::Build(BuildError::BinaryNotFound { path }) => {
                assert!(path.ends_with("x86_64-pc-windows-gnu/release/tool.exe"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
