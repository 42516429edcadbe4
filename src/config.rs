//! Agent configuration
//!
//! Resolution order: explicit path, `$LINEAGE_CONFIG`, then
//! `<config_dir>/lineage/config.yaml`; with no file, defaults apply.
//! `LINEAGE_NAMESPACE`, `LINEAGE_PARENT_RUN_ID` and `LINEAGE_PARENT_JOB_NAME`
//! override whatever the file says.

use crate::binding::Location;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const CONFIG_ENV: &str = "LINEAGE_CONFIG";
pub const NAMESPACE_ENV: &str = "LINEAGE_NAMESPACE";
pub const PARENT_RUN_ID_ENV: &str = "LINEAGE_PARENT_RUN_ID";
pub const PARENT_JOB_NAME_ENV: &str = "LINEAGE_PARENT_JOB_NAME";

/// Process-wide settings shared by every job the agent tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineageConfig {
    /// Namespace of emitted jobs (and of the parent job)
    pub namespace: String,
    /// Run id of the orchestrating run above this application
    pub parent_run_id: String,
    /// Name of the orchestrating job above this application
    pub parent_job_name: String,
    /// Application display name; job names derive from it
    pub app_name: Option<String>,
    /// Filesystem that bare paths in job configurations belong to
    pub default_fs: String,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            parent_run_id: Uuid::new_v4().to_string(),
            parent_job_name: "unknown".to_string(),
            app_name: None,
            default_fs: "file:///".to_string(),
        }
    }
}

impl LineageConfig {
    /// Parse a YAML document; missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Load from the first config file found, then apply env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::locate(explicit) {
            Some(path) => {
                debug!(path = %path.display(), "loading lineage config");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(ns) = lookup(NAMESPACE_ENV) {
            self.namespace = ns;
        }
        if let Some(run_id) = lookup(PARENT_RUN_ID_ENV) {
            self.parent_run_id = run_id;
        }
        if let Some(job) = lookup(PARENT_JOB_NAME_ENV) {
            self.parent_job_name = job;
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The parsed default filesystem
    pub fn default_fs_location(&self) -> Result<Location, ConfigError> {
        Location::parse(&self.default_fs)
            .map_err(|e| ConfigError::Invalid(format!("default_fs: {}", e)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".to_string()));
        }
        self.default_fs_location().map(|_| ())
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("lineage").join("config.yaml"))
            .filter(|path| path.is_file())
    }
}
