//! Release configuration.
//!
//! Settings come from an optional `gamesstore-release.toml` at the tree root.
//! Every field has a default matching the GamesStore repository layout, so a
//! missing file is not an error.

mod env;

pub use env::EnvConfig;

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up at the tree root when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "gamesstore-release.toml";

/// Project-level release settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Version file rewritten on every release
    pub version_file: PathBuf,
    /// Directory holding timestamped backups
    pub backup_dir: PathBuf,
    /// Files that must exist before a release starts
    pub required_files: Vec<PathBuf>,
    /// Directories that must exist before a release starts
    pub required_dirs: Vec<PathBuf>,
    /// Remote to push to
    pub remote: String,
    /// Branch to push and pull
    pub branch: String,
    /// Hosting repository as `owner/name`; parsed from the remote URL when unset
    pub repository: Option<String>,
    /// Workflow file or id dispatched after tagging
    pub workflow: String,
    /// Delay after a stable tag push
    pub stable_wait_seconds: u64,
    /// Delay after a beta tag push
    pub beta_wait_seconds: u64,
    /// Secure variant settings
    pub secure: SecureConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version_file: PathBuf::from("version.py"),
            backup_dir: PathBuf::from("backup"),
            required_files: vec![
                PathBuf::from("uxmod.py"),
                PathBuf::from("xcore.py"),
                PathBuf::from("datax.py"),
            ],
            required_dirs: Vec::new(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            repository: None,
            workflow: "build.yml".to_string(),
            stable_wait_seconds: 15,
            beta_wait_seconds: 10,
            secure: SecureConfig::default(),
        }
    }
}

/// Settings for the source-stripping secure release
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecureConfig {
    /// Command compiling sources into native modules (program first)
    pub build_command: Vec<String>,
    /// File names never deleted by the strip pass
    pub keep_files: Vec<String>,
    /// Extensions treated as source text
    pub source_extensions: Vec<String>,
    /// Nested directories scanned recursively for sources
    pub strip_dirs: Vec<PathBuf>,
    /// Generated directories removed after the build
    pub artifact_dirs: Vec<String>,
    /// Generated intermediate file extensions removed after the build
    pub artifact_extensions: Vec<String>,
    /// Compiled extensions re-included by the ignore rules
    pub binary_extensions: Vec<String>,
}

impl Default for SecureConfig {
    fn default() -> Self {
        Self {
            build_command: vec![
                "python".to_string(),
                "setup.py".to_string(),
                "build_ext".to_string(),
                "--inplace".to_string(),
            ],
            keep_files: vec![
                "main.py".to_string(),
                "setup.py".to_string(),
                "version.py".to_string(),
            ],
            source_extensions: vec!["py".to_string()],
            strip_dirs: vec![PathBuf::from("core")],
            artifact_dirs: vec![
                "build".to_string(),
                "__pycache__".to_string(),
                "venv".to_string(),
                ".venv".to_string(),
                "env".to_string(),
            ],
            artifact_extensions: vec!["c".to_string()],
            binary_extensions: vec!["pyd".to_string(), "so".to_string()],
        }
    }
}

impl ProjectConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `gamesstore-release.toml` under
    /// `root` is used when present, defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml_str(&content).map_err(|reason| ConfigError::Invalid {
            path: path.clone(),
            reason,
        })?;
        log::debug!("Loaded release config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.version_file.as_os_str().is_empty() {
            return Err("version_file must not be empty".to_string());
        }
        if self.backup_dir.as_os_str().is_empty() {
            return Err("backup_dir must not be empty".to_string());
        }
        if self.remote.trim().is_empty() {
            return Err("remote must not be empty".to_string());
        }
        if self.branch.trim().is_empty() {
            return Err("branch must not be empty".to_string());
        }
        for path in self.required_files.iter().chain(&self.required_dirs) {
            if path.is_absolute() {
                return Err(format!(
                    "required entries must be relative paths: {}",
                    path.display()
                ));
            }
        }
        let mut names = std::collections::HashSet::new();
        for path in &self.required_files {
            if let Some(name) = path.file_name()
                && !names.insert(name)
            {
                return Err(format!(
                    "required files share the backup name {}: rename one of them",
                    name.to_string_lossy()
                ));
            }
        }
        Ok(())
    }

    /// Wait duration for a release channel, honouring the environment override
    pub fn wait_duration(&self, beta: bool, env: &EnvConfig) -> Duration {
        let configured = if beta {
            self.beta_wait_seconds
        } else {
            self.stable_wait_seconds
        };
        Duration::from_secs(env.wait_seconds_override().unwrap_or(configured))
    }
}
