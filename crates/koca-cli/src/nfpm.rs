//! Writing system packages with [nfpm](https://nfpm.goreleaser.com)
//!
//! koca never builds archives itself. The packaged tree under `pkgdir` and the
//! build file metadata are rendered into an nfpm YAML config, and `nfpm
//! package` produces the `.deb` or `.rpm`.

use crate::errors::CliError;
use koca_logger as logger;
use koca_syntax::{BuildFile, PackageFormat};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use walkdir::WalkDir;

const PLATFORM: &str = "linux";
const OWNER: &str = "root";

/// Ownership and permissions of a packaged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NfpmFileInfo {
    pub mode: u32,
    pub owner: String,
    pub group: String,
}

/// One `contents` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NfpmContent {
    pub src: String,
    pub dst: String,
    /// `symlink` for links, absent for regular files.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub file_info: NfpmFileInfo,
}

/// An nfpm config.
#[derive(Debug, Clone, Serialize)]
pub struct NfpmConfig {
    pub name: String,
    pub arch: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u32>,
    pub version: String,
    /// Don't let nfpm reinterpret `pkgver` as semver.
    pub version_schema: String,
    pub release: u32,
    pub maintainer: String,
    pub description: String,
    pub contents: Vec<NfpmContent>,
}

impl NfpmConfig {
    /// Describe `build_file` packaged from the tree under `pkgdir`.
    pub fn new(
        build_file: &BuildFile,
        format: PackageFormat,
        pkgdir: &Path,
    ) -> Result<Self, CliError> {
        let version = build_file.version();
        let arch = build_file
            .arch()
            .first()
            .map(|arch| arch.name_for(format))
            .unwrap_or("all");

        Ok(NfpmConfig {
            name: build_file.pkgname().to_string(),
            arch: arch.to_string(),
            platform: PLATFORM.to_string(),
            epoch: (version.epoch != 0).then_some(version.epoch),
            version: version.pkgver.clone(),
            version_schema: "none".to_string(),
            release: version.pkgrel,
            maintainer: build_file.maintainer().to_string(),
            description: build_file.pkgdesc().to_string(),
            contents: collect_contents(pkgdir)?,
        })
    }

    pub fn to_yaml(&self) -> Result<String, CliError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Every file and symlink under `pkgdir`, mapped to its installed location.
pub fn collect_contents(pkgdir: &Path) -> Result<Vec<NfpmContent>, CliError> {
    let mut contents = Vec::new();

    for entry in WalkDir::new(pkgdir).sort_by_file_name() {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(pkgdir)
            .map_err(|e| CliError::PackageFailed(e.to_string()))?;
        let dst = Path::new("/").join(relative).display().to_string();

        let (src, kind) = if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            (target.display().to_string(), Some("symlink".to_string()))
        } else {
            (std::path::absolute(entry.path())?.display().to_string(), None)
        };

        contents.push(NfpmContent {
            src,
            dst,
            kind,
            file_info: NfpmFileInfo {
                mode: file_mode(&entry)?,
                owner: OWNER.to_string(),
                group: OWNER.to_string(),
            },
        });
    }

    debug!("Collected {} entries from {}", contents.len(), pkgdir.display());
    Ok(contents)
}

#[cfg(unix)]
fn file_mode(entry: &walkdir::DirEntry) -> Result<u32, CliError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(entry.metadata()?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(entry: &walkdir::DirEntry) -> Result<u32, CliError> {
    let readonly = entry.metadata()?.permissions().readonly();
    Ok(if readonly { 0o444 } else { 0o644 })
}

/// Turns a packaged tree into an archive at `target`.
pub trait PackageWriter {
    fn write(
        &self,
        build_file: &BuildFile,
        format: PackageFormat,
        pkgdir: &Path,
        target: &Path,
    ) -> Result<(), CliError>;
}

/// Writes archives by running `nfpm package`.
#[derive(Debug, Clone)]
pub struct NfpmWriter {
    program: PathBuf,
    config_path: PathBuf,
}

impl NfpmWriter {
    /// `config_path` is where the generated nfpm config is written.
    pub fn new(program: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        NfpmWriter {
            program: program.into(),
            config_path: config_path.into(),
        }
    }
}

impl PackageWriter for NfpmWriter {
    fn write(
        &self,
        build_file: &BuildFile,
        format: PackageFormat,
        pkgdir: &Path,
        target: &Path,
    ) -> Result<(), CliError> {
        let config = NfpmConfig::new(build_file, format, pkgdir)?;
        fs::write(&self.config_path, config.to_yaml()?)?;
        logger::debug(&format!("Wrote nfpm config to {}", self.config_path.display()));

        let output = Command::new(&self.program)
            .arg("package")
            .arg("--config")
            .arg(&self.config_path)
            .arg("--packager")
            .arg(format.as_str())
            .arg("--target")
            .arg(target)
            .output()?;
        logger::capture_output("nfpm package", &output);

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CliError::PackageFailed(stderr.trim().to_string()))
        }
    }
}
