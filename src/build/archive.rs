//! Archive creation and checksums for compiled binaries.
//!
//! All functions here do blocking file I/O; async callers run them through
//! `spawn_blocking`.

use crate::build::ArchiveFormat;
use anyhow::Context;
use flate2::{Compression, write::GzEncoder};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::HeaderMode;

/// A file to place in an archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// File on disk
    pub source: PathBuf,
    /// Path inside the archive
    pub name: String,
    /// Mark as executable (unix mode 0755)
    pub executable: bool,
}

impl ArchiveEntry {
    fn mode(&self) -> u32 {
        if self.executable { 0o755 } else { 0o644 }
    }
}

/// Write `entries` into `dest` using `format`
pub fn package(format: ArchiveFormat, dest: &Path, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    match format {
        ArchiveFormat::Zip => write_zip(dest, entries),
        ArchiveFormat::TarGz => write_tar_gz(dest, entries),
    }
}

fn write_zip(dest: &Path, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    let file = File::create(dest).with_context(|| format!("creating {}", dest.display()))?;
    let mut writer = zip::ZipWriter::new(file);

    for entry in entries {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(entry.mode());
        writer
            .start_file(entry.name.as_str(), options)
            .with_context(|| format!("adding {} to zip", entry.name))?;
        let mut src = File::open(&entry.source)
            .with_context(|| format!("opening {}", entry.source.display()))?;
        std::io::copy(&mut src, &mut writer)
            .with_context(|| format!("compressing {}", entry.source.display()))?;
    }

    let mut file = writer.finish().context("finalizing zip")?;
    file.flush()?;
    Ok(())
}

fn write_tar_gz(dest: &Path, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    let file = File::create(dest).with_context(|| format!("creating {}", dest.display()))?;
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for entry in entries {
        let mut src = File::open(&entry.source)
            .with_context(|| format!("opening {}", entry.source.display()))?;
        let metadata = src.metadata()?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(&metadata, HeaderMode::Deterministic);
        header.set_mode(entry.mode());
        tar.append_data(&mut header, &entry.name, &mut src)
            .with_context(|| format!("adding {} to tarball", entry.name))?;
    }

    let enc = tar.into_inner().context("finalizing tarball")?;
    let mut finished = enc.finish().context("finalizing gzip stream")?;
    finished.flush()?;
    Ok(())
}

/// SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> anyhow::Result<String> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Write `<archive>.sha256` in `sha256sum` format and return its path and the digest
pub fn write_checksum(archive: &Path) -> anyhow::Result<(PathBuf, String)> {
    let digest = sha256_file(archive)?;
    let file_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .context("archive path has no file name")?;

    let checksum_path = archive.with_file_name(format!("{file_name}.sha256"));
    std::fs::write(&checksum_path, format!("{digest}  {file_name}\n"))
        .with_context(|| format!("writing {}", checksum_path.display()))?;

    Ok((checksum_path, digest))
}
