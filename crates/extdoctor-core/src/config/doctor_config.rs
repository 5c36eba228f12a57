//! The `config.yaml` model

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Complete extdoctor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorConfig {
    pub site: SiteConfig,
    pub database: DatabaseConfig,
    pub uninstall: UninstallConfig,
    pub core: CoreConfig,
    pub report: ReportConfig,
}

/// Location of the audited installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Installation root; every extension path is relative to it
    pub root: Utf8PathBuf,

    /// Whether the installation has an `api` application area
    pub api_enabled: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            api_enabled: true,
        }
    }
}

/// Database holding the platform tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file with the extension tables
    pub path: Option<Utf8PathBuf>,

    /// Table prefix substituted for `#__`
    pub prefix: String,

    /// Driver name matched against manifest SQL declarations
    pub driver: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            prefix: "jos_".to_string(),
            driver: "mysql".to_string(),
        }
    }
}

/// Platform console used for polite uninstalls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UninstallConfig {
    pub php: String,

    /// Console script, relative to the site root
    pub console: String,
}

impl Default for UninstallConfig {
    fn default() -> Self {
        Self {
            php: "php".to_string(),
            console: "cli/joomla.php".to_string(),
        }
    }
}

/// Additions to the built-in core extension list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Keys such as `component:com_foo` or `plugin:system:foo`
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Lowest severity shown in reports
    pub min_severity: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_severity: "info".to_string(),
        }
    }
}

impl DoctorConfig {
    /// Check values that would otherwise fail deep inside an audit
    pub fn validate(&self) -> Result<()> {
        if !self
            .database
            .prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::invalid_config(format!(
                "database.prefix may only contain letters, digits and underscores, got '{}'",
                self.database.prefix
            )));
        }

        if self.database.driver.trim().is_empty() {
            return Err(Error::invalid_config("database.driver must not be empty"));
        }

        Ok(())
    }

    /// Database file, failing when none is configured
    pub fn database_path(&self) -> Result<Utf8PathBuf> {
        self.database.path.clone().ok_or_else(|| {
            Error::invalid_config(
                "database.path is not set (use --db, EXTDOCTOR_DB_PATH or the config file)",
            )
        })
    }

    /// Absolute path of the uninstall console script
    pub fn console_path(&self) -> Utf8PathBuf {
        self.site.root.join(&self.uninstall.console)
    }
}
