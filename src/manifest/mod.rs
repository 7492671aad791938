//! Manifest reading: dotted-path lookups into a project's `Cargo.toml`.

use crate::error::{ManifestError, Result};
use std::path::{Path, PathBuf};

/// Dotted path of the version field in a Cargo manifest
pub const VERSION_FIELD: &str = "package.version";

/// Capability for reading string fields out of a structured manifest
pub trait ManifestReader {
    /// Return the string value stored at `field` (dot separated) in the manifest at `path`
    fn read_field(&self, path: &Path, field: &str) -> Result<String>;

    /// Return `package.version` unmodified
    fn read_version(&self, path: &Path) -> Result<String> {
        self.read_field(path, VERSION_FIELD)
    }

    /// Return `package.name`
    fn package_name(&self, path: &Path) -> Result<String> {
        self.read_field(path, "package.name")
    }

    /// Name of the binary the manifest builds
    fn binary_name(&self, path: &Path) -> Result<String>;
}

/// TOML manifest reader backed by the `toml` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestReader;

impl ManifestReader for TomlManifestReader {
    fn read_field(&self, path: &Path, field: &str) -> Result<String> {
        let table = load_table(path)?;
        Ok(string_field(&table, path, field)?)
    }

    fn binary_name(&self, path: &Path) -> Result<String> {
        let table = load_table(path)?;
        Ok(discover_binary(&table, path)?)
    }
}

/// Parse the manifest at `path` into a TOML table
pub fn load_table(path: &Path) -> std::result::Result<toml::Table, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<toml::Table>(&content).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })
}

/// Walk a dotted path through nested tables
pub fn lookup<'a>(table: &'a toml::Table, field: &str) -> Option<&'a toml::Value> {
    let mut segments = field.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Look up `field` and require it to be a string
pub fn string_field(
    table: &toml::Table,
    path: &Path,
    field: &str,
) -> std::result::Result<String, ManifestError> {
    let value = lookup(table, field).ok_or_else(|| ManifestError::NotFound {
        path: path.to_path_buf(),
        field: field.to_string(),
    })?;

    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ManifestError::NotAString {
            path: path.to_path_buf(),
            field: field.to_string(),
            found: value.type_str().to_string(),
        })
}

/// First `[[bin]]` name, falling back to `package.name`
pub fn discover_binary(
    table: &toml::Table,
    path: &Path,
) -> std::result::Result<String, ManifestError> {
    if let Some(name) = table
        .get("bin")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("name"))
        .and_then(|v| v.as_str())
    {
        return Ok(name.to_string());
    }

    string_field(table, path, "package.name")
}

/// Directory containing the manifest (where cargo must run)
pub fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use std::io::Write;

    fn manifest(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write manifest");
        file
    }

    #[test]
    fn reads_version_verbatim() {
        let file = manifest(
            r#"
[package]
name = "demo"
version = "1.4.0-rc.1+build.7"
"#,
        );
        let version = TomlManifestReader.read_version(file.path()).unwrap();
        assert_eq!(version, "1.4.0-rc.1+build.7");
    }

    #[test]
    fn missing_version_is_not_found() {
        let file = manifest("[package]\nname = \"demo\"\n");
        let err = TomlManifestReader.read_version(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::NotFound { ref field, .. }) if field == "package.version"
        ));
    }

    #[test]
    fn missing_section_is_not_found() {
        let file = manifest("[workspace]\nmembers = []\n");
        let err = TomlManifestReader.read_version(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_manifest_is_parse_error() {
        let file = manifest("[package\nversion = ");
        let err = TomlManifestReader.read_version(file.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::Manifest(ManifestError::Parse { .. })));
    }

    #[test]
    fn inherited_version_is_not_a_string() {
        let file = manifest("[package]\nname = \"demo\"\nversion.workspace = true\n");
        let err = TomlManifestReader.read_version(file.path()).unwrap_err();
        match err {
            ReleaseError::Manifest(ManifestError::NotAString { found, .. }) => {
                assert_eq!(found, "table")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn arbitrary_dotted_fields() {
        let file = manifest(
            r#"
[package]
name = "demo"
version = "0.1.0"

[package.metadata.release]
channel = "stable"
"#,
        );
        let channel = TomlManifestReader
            .read_field(file.path(), "package.metadata.release.channel")
            .unwrap();
        assert_eq!(channel, "stable");
    }

    #[test]
    fn binary_prefers_bin_section() {
        let file = manifest(
            r#"
[package]
name = "demo"
version = "0.1.0"

[[bin]]
name = "demo-cli"
path = "src/main.rs"
"#,
        );
        assert_eq!(TomlManifestReader.binary_name(file.path()).unwrap(), "demo-cli");
        assert_eq!(TomlManifestReader.package_name(file.path()).unwrap(), "demo");

        let plain = manifest("[package]\nname = \"demo\"\nversion = \"0.1.0\"\n");
        assert_eq!(TomlManifestReader.binary_name(plain.path()).unwrap(), "demo");
    }

    #[test]
    fn manifest_dir_of_bare_file_name() {
        assert_eq!(manifest_dir(Path::new("Cargo.toml")), PathBuf::from("."));
        assert_eq!(
            manifest_dir(Path::new("crates/app/Cargo.toml")),
            PathBuf::from("crates/app")
        );
    }
}
