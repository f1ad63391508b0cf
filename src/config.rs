//! Recorder configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (AUDIT_TRAIL_LOG_DIR, AUDIT_TRAIL_LOG_FILE,
//!    AUDIT_TRAIL_USER_VAR)
//! 2. Config file (.audit-trail/config.yaml)
//! 3. Defaults (/var/log/ansible/audit.log)
//!
//! Config file discovery:
//! - Searches current directory and parents for .audit-trail/config.yaml
//! - A relative `log_dir` is resolved against the directory containing
//!   .audit-trail/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory searched for `config.yaml`
pub const CONFIG_DIR: &str = ".audit-trail";

pub const DEFAULT_LOG_DIR: &str = "/var/log/ansible";
pub const DEFAULT_LOG_FILE: &str = "audit.log";
pub const DEFAULT_USER_OVERRIDE_VAR: &str = "JENKINS_USER";
pub const DEFAULT_ENVIRONMENT_VAR: &str = "environment_name";

pub const ENV_LOG_DIR: &str = "AUDIT_TRAIL_LOG_DIR";
pub const ENV_LOG_FILE: &str = "AUDIT_TRAIL_LOG_FILE";
pub const ENV_USER_VAR: &str = "AUDIT_TRAIL_USER_VAR";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub log_dir: Option<String>,
    pub log_file: Option<String>,
    /// Environment variable naming the invoking user
    pub user_override_var: Option<String>,
    /// Host variable holding the environment label
    pub environment_var: Option<String>,
    pub sync_writes: Option<bool>,
}

/// Resolved recorder settings
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderSettings {
    /// Directory holding the audit log
    pub log_dir: PathBuf,
    /// Log file name inside `log_dir`
    pub log_file: String,
    /// Environment variable that overrides the OS user
    pub user_override_var: String,
    /// Host variable read for the environment label
    pub environment_var: String,
    /// fsync each record before closing the file
    pub sync_writes: bool,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_file: DEFAULT_LOG_FILE.to_string(),
            user_override_var: DEFAULT_USER_OVERRIDE_VAR.to_string(),
            environment_var: DEFAULT_ENVIRONMENT_VAR.to_string(),
            sync_writes: false,
            config_file: None,
        }
    }
}

impl RecorderSettings {
    /// Load settings from the process environment and any discovered config file
    pub fn load() -> Result<Self> {
        let file = match find_config_file() {
            Some(path) => {
                let config = load_config_file(&path)?;
                Some((path, config))
            }
            None => None,
        };

        Ok(Self::resolve(file, |name| std::env::var(name).ok()))
    }

    /// Merge an optional config file and an environment lookup over defaults
    pub fn resolve<E>(file: Option<(PathBuf, ConfigFile)>, env: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some((path, config)) = file {
            // Base directory is the parent of .audit-trail/
            let base_dir = path
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(Path::new("."));

            if let Some(ref dir) = config.log_dir {
                settings.log_dir = resolve_path(base_dir, dir);
            }
            if let Some(file_name) = config.log_file {
                settings.log_file = file_name;
            }
            if let Some(var) = config.user_override_var {
                settings.user_override_var = var;
            }
            if let Some(var) = config.environment_var {
                settings.environment_var = var;
            }
            settings.sync_writes = config.sync_writes.unwrap_or(false);
            settings.config_file = Some(path);
        }

        let env = |name: &str| env(name).filter(|v| !v.is_empty());

        if let Some(dir) = env(ENV_LOG_DIR) {
            settings.log_dir = PathBuf::from(dir);
        }
        if let Some(file_name) = env(ENV_LOG_FILE) {
            settings.log_file = file_name;
        }
        if let Some(var) = env(ENV_USER_VAR) {
            settings.user_override_var = var;
        }

        settings
    }

    /// Full path of the audit log
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;
    find_config_file_from(&current)
}

fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
