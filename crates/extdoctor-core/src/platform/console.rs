//! Uninstalls through the platform's command-line console

use super::Uninstaller;
use crate::config::DoctorConfig;
use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Runs `php cli/joomla.php extension:remove <id>` in the site root
pub struct ConsoleUninstaller {
    php: String,
    console: String,
    site_root: Utf8PathBuf,
}

impl ConsoleUninstaller {
    pub fn new(php: impl Into<String>, console: impl Into<String>, site_root: Utf8PathBuf) -> Self {
        Self {
            php: php.into(),
            console: console.into(),
            site_root,
        }
    }

    pub fn from_config(config: &DoctorConfig) -> Self {
        Self::new(
            config.uninstall.php.clone(),
            config.uninstall.console.clone(),
            config.site.root.clone(),
        )
    }
}

impl Uninstaller for ConsoleUninstaller {
    fn uninstall(&self, id: i64) -> Result<()> {
        debug!("Running {} {} extension:remove {}", self.php, self.console, id);

        let id_arg = id.to_string();
        let output = Command::new(&self.php)
            .current_dir(&self.site_root)
            .args([self.console.as_str(), "extension:remove", id_arg.as_str(), "--no-interaction"])
            .output()
            .map_err(|e| Error::uninstall(id, format!("could not run {}: {}", self.php, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::uninstall(id, message));
        }

        info!("Extension {} uninstalled", id);
        Ok(())
    }

    fn reset_adapter_cache(&self) {
        // Every uninstall is a fresh console process with no cached adapters
        debug!("Installer adapter cache reset");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_failed_command_becomes_uninstall_error() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        // `false` ignores its arguments and exits non-zero
        let uninstaller = ConsoleUninstaller::new("false", "cli/joomla.php", root);

        let err = uninstaller.uninstall(7).unwrap_err();
        assert!(matches!(err, Error::Uninstall { id: 7, .. }));
    }

    #[test]
    fn test_missing_binary_becomes_uninstall_error() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let uninstaller = ConsoleUninstaller::new("/nonexistent/php-binary", "cli/joomla.php", root);

        assert!(uninstaller.uninstall(1).is_err());
    }

    #[test]
    fn test_successful_command() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let uninstaller = ConsoleUninstaller::new("true", "cli/joomla.php", root);

        assert!(uninstaller.uninstall(3).is_ok());
    }
}
