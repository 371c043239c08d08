//! User configuration for koca
//!
//! Stored as TOML at `~/.config/koca/koca.toml`. `KOCA_CONFIG` points at a
//! different file, as does a `.koca_config_path` pointer file next to the
//! default location.

use koca_syntax::PackageFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use which::which;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "KOCA_CONFIG";

const POINTER_FILE: &str = ".koca_config_path";
const DEFAULT_WORK_DIR: &str = "koca";
const DEFAULT_SHELL: &str = "bash";

/// Every key accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: [&str; 5] = ["output-type", "output-dir", "work-dir", "shell", "nfpm-path"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Unknown config key: {key}. Supported keys: {keys}", keys = KEYS.join(", "))]
    UnknownKey { key: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("nfpm is not installed. Install it from https://nfpm.goreleaser.com/install/ or set nfpm-path")]
    NfpmNotFound,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<PackageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfpm_path: Option<String>,
}

impl Config {
    /// Resolve the config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_path()?;
        if let Some(target) = default.parent().and_then(read_pointer) {
            return Ok(target);
        }
        Ok(default)
    }

    /// `~/.config/koca/koca.toml`, ignoring any override.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("koca");

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("koca");

        Ok(dir.join("koca.toml"))
    }

    /// Pointer file that redirects [`Config::path`], next to the default config.
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        let default = Self::default_path()?;
        Ok(default
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(POINTER_FILE))
    }

    /// Make [`Config::path`] resolve to `target` from now on.
    pub fn set_path(target: &str) -> Result<(), ConfigError> {
        let pointer = Self::pointer_path()?;
        if let Some(parent) = pointer.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&pointer, target.trim())?;
        Ok(())
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`; a missing file is an empty config.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output-type" => self.output_type.map(|format| format.to_string()),
            "output-dir" => self.output_dir.clone(),
            "work-dir" => self.work_dir.clone(),
            "shell" => self.shell.clone(),
            "nfpm-path" => self.nfpm_path.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "output-type" => {
                let format = value
                    .parse::<PackageFormat>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        key: key.to_string(),
                        reason,
                    })?;
                self.output_type = Some(format);
            }
            "output-dir" => self.output_dir = Some(value),
            "work-dir" => self.work_dir = Some(value),
            "shell" => self.shell = Some(value),
            "nfpm-path" => self.nfpm_path = Some(value),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values_iter().is_empty()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    pub fn get_output_type(&self) -> PackageFormat {
        self.output_type.unwrap_or_default()
    }

    pub fn get_output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or("."))
    }

    /// Scratch directory for the build, relative to the working directory
    /// unless configured as an absolute path.
    pub fn get_work_dir(&self) -> PathBuf {
        PathBuf::from(self.work_dir.as_deref().unwrap_or(DEFAULT_WORK_DIR))
    }

    /// Where the `build` and `package` functions run.
    pub fn get_src_dir(&self) -> PathBuf {
        self.get_work_dir().join("src")
    }

    /// The package root handed to `package` as `pkgdir`.
    pub fn get_pkg_dir(&self) -> PathBuf {
        self.get_work_dir().join("pkg")
    }

    pub fn get_shell(&self) -> String {
        self.shell.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string())
    }

    /// Locate `nfpm`, remembering it in the config once found.
    pub fn ensure_nfpm_path(&mut self) -> Result<String, ConfigError> {
        if let Some(ref path) = self.nfpm_path {
            if Path::new(path).exists() {
                return Ok(path.clone());
            }
            self.nfpm_path = None;
        }

        let path = which("nfpm").map_err(|_| ConfigError::NfpmNotFound)?;
        let path = path.to_string_lossy().trim().to_string();
        self.nfpm_path = Some(path.clone());
        self.save()?;
        Ok(path)
    }
}

fn read_pointer(dir: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(dir.join(POINTER_FILE)).ok()?;
    let trimmed = contents.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
