//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Global config (~/.extdoctor/config.yaml)
//! 3. Explicit config file (--config)
//! 4. Environment variables (EXTDOCTOR_* prefix)
//! 5. CLI flags (handled by caller)

use super::DoctorConfig;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "defaults.yaml";
const GLOBAL_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Directory holding the global config file
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at `~/.extdoctor`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|_| Error::invalid_config("Home directory is not valid UTF-8"))?;

        Ok(Self {
            config_dir: home.join(".extdoctor"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load the configuration with hierarchical precedence
    ///
    /// `explicit` is the file named on the command line; unlike the global
    /// file it must exist.
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<DoctorConfig> {
        let mut merged = Self::load_embedded_defaults()?;

        let global = self.config_dir.join(GLOBAL_FILE);
        if global.exists() {
            debug!("Merging global config {}", global);
            merge_values(&mut merged, Self::load_yaml_file(&global)?);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::config_not_found(path.as_str()));
            }
            debug!("Merging explicit config {}", path);
            merge_values(&mut merged, Self::load_yaml_file(path)?);
        }

        let config: DoctorConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to parse configuration: {}", e)))?;

        let config = Self::apply_env_overrides(config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load the embedded defaults as an untyped tree
    fn load_embedded_defaults() -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    /// Load a YAML file as an untyped tree
    fn load_yaml_file(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

        // An empty file parses as null and overrides nothing
        Ok(match value {
            Value::Null => Value::Mapping(Default::default()),
            other => other,
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: DoctorConfig) -> Result<DoctorConfig> {
        if let Ok(val) = env::var("EXTDOCTOR_SITE_ROOT") {
            config.site.root = Utf8PathBuf::from(val);
        }

        if let Ok(val) = env::var("EXTDOCTOR_API_ENABLED") {
            config.site.api_enabled = val.parse().map_err(|_| {
                Error::invalid_config("EXTDOCTOR_API_ENABLED must be true or false")
            })?;
        }

        if let Ok(val) = env::var("EXTDOCTOR_DB_PATH") {
            config.database.path = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("EXTDOCTOR_DB_PREFIX") {
            config.database.prefix = val;
        }

        if let Ok(val) = env::var("EXTDOCTOR_DB_DRIVER") {
            config.database.driver = val;
        }

        if let Ok(val) = env::var("EXTDOCTOR_PHP") {
            config.uninstall.php = val;
        }

        if let Ok(val) = env::var("EXTDOCTOR_MIN_SEVERITY") {
            config.report.min_severity = val;
        }

        Ok(config)
    }
}

/// Recursively merge `overlay` into `base`; mappings merge, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
