//! Configuration module for onesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, saving, validation, defaults, and a builder pattern for
//! programmatic use.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{ConflictBehavior, DomainError};
use crate::paths::PathTranslator;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for onesync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub drive: DriveConfig,
    pub tasks: TasksConfig,
    pub logging: LoggingConfig,
}

/// Per-drive settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Drive prefix in the remote namespace, e.g. `/drive` or `/drives/{id}`.
    pub drive_path: String,
    /// Root directory of the local mirror. A leading `~` is expanded.
    pub local_root: PathBuf,
    /// Largest body fetched with a single GET request.
    ///
    /// Read by the drive client adapter; tasks always pass the full item
    /// size and leave chunking to the adapter.
    pub max_get_size_bytes: u64,
    /// Largest body sent with a single PUT request.
    ///
    /// Read by the drive client adapter when it splits uploads into
    /// sessions.
    pub max_put_size_bytes: u64,
    /// Files holding ignore rules, one glob per line.
    pub ignore_files: Vec<PathBuf>,
    /// Proxy URL per scheme (`http`, `https`), for the drive client
    /// adapter's HTTP transport.
    pub proxies: BTreeMap<String, String>,
}

/// Task execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Maximum number of tasks running at once (`TaskRunner::run_with_config`).
    pub max_concurrent: usize,
    /// Conflict behavior for remote items created from new local entries.
    pub default_conflict_behavior: ConflictBehavior,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Write the configuration as YAML to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/onesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("onesync")
            .join("config.yaml")
    }
}

impl DriveConfig {
    /// Local root with a leading `~` replaced by the home directory.
    pub fn resolved_local_root(&self) -> PathBuf {
        expand_home(&self.local_root)
    }

    /// Build the path translator for this drive.
    pub fn translator(&self) -> Result<PathTranslator, DomainError> {
        PathTranslator::new(&self.drive_path, self.resolved_local_root())
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// 1 MiB
const DEFAULT_MAX_GET_SIZE: u64 = 1024 * 1024;
/// 512 KiB
const DEFAULT_MAX_PUT_SIZE: u64 = 512 * 1024;
/// Upper bound the drive accepts for a single upload request.
const MAX_PUT_SIZE_LIMIT: u64 = 60 * 1024 * 1024;

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            drive_path: "/drive".to_string(),
            local_root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("OneDrive"),
            max_get_size_bytes: DEFAULT_MAX_GET_SIZE,
            max_put_size_bytes: DEFAULT_MAX_PUT_SIZE,
            ignore_files: Vec::new(),
            proxies: BTreeMap::new(),
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            default_conflict_behavior: ConflictBehavior::Rename,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"tasks.max_concurrent"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- drive ---
        if !self.drive.drive_path.starts_with('/') {
            errors.push(ValidationError {
                field: "drive.drive_path".into(),
                message: format!("must start with '/': {}", self.drive.drive_path),
            });
        }

        let root_str = self.drive.local_root.to_string_lossy();
        if !root_str.starts_with('~') && !self.drive.local_root.is_absolute() {
            errors.push(ValidationError {
                field: "drive.local_root".into(),
                message: format!("must be absolute: {}", self.drive.local_root.display()),
            });
        }

        if self.drive.max_get_size_bytes == 0 {
            errors.push(ValidationError {
                field: "drive.max_get_size_bytes".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.drive.max_put_size_bytes == 0 {
            errors.push(ValidationError {
                field: "drive.max_put_size_bytes".into(),
                message: "must be greater than 0".into(),
            });
        } else if self.drive.max_put_size_bytes > MAX_PUT_SIZE_LIMIT {
            errors.push(ValidationError {
                field: "drive.max_put_size_bytes".into(),
                message: format!(
                    "max_put_size_bytes ({}) must not exceed {MAX_PUT_SIZE_LIMIT}",
                    self.drive.max_put_size_bytes
                ),
            });
        }

        // --- tasks ---
        if !(1..=64).contains(&self.tasks.max_concurrent) {
            errors.push(ValidationError {
                field: "tasks.max_concurrent".into(),
                message: "must be in range 1..=64".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use onesync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .local_root(PathBuf::from("/home/user/OneDrive"))
///     .max_concurrent(8)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- drive ---

    pub fn drive_path(mut self, drive_path: impl Into<String>) -> Self {
        self.config.drive.drive_path = drive_path.into();
        self
    }

    pub fn local_root(mut self, root: PathBuf) -> Self {
        self.config.drive.local_root = root;
        self
    }

    pub fn max_get_size_bytes(mut self, bytes: u64) -> Self {
        self.config.drive.max_get_size_bytes = bytes;
        self
    }

    pub fn max_put_size_bytes(mut self, bytes: u64) -> Self {
        self.config.drive.max_put_size_bytes = bytes;
        self
    }

    pub fn ignore_file(mut self, path: PathBuf) -> Self {
        self.config.drive.ignore_files.push(path);
        self
    }

    pub fn proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.drive.proxies.insert(scheme.into(), url.into());
        self
    }

    // --- tasks ---

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.tasks.max_concurrent = n;
        self
    }

    pub fn default_conflict_behavior(mut self, behavior: ConflictBehavior) -> Self {
        self.config.tasks.default_conflict_behavior = behavior;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
