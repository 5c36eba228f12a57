//! Uninstall workflows
//!
//! Three levels of escalating aggressiveness:
//!
//! - [`Remover::polite`] asks the platform to uninstall, scripts included;
//! - [`Remover::skip_scripts`] does the same with the extension's install
//!   script moved out of the way, for scripts that abort the uninstall;
//! - [`Remover::forced`] bypasses the platform and wipes the footprint
//!   directly: tables, files, directories, media, translations, script and
//!   manifest.
//!
//! Batches run in the order given. The installer adapter cache is reset
//! between extensions and the first failure stops the batch.

use crate::context::AuditContext;
use crate::record::ExtensionRecord;
use extdoctor_core::error::{Error, Result};
use extdoctor_core::platform::Uninstaller;
use camino::Utf8PathBuf;
use serde::Serialize;
use std::fs;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Directories owned by the platform itself, never deleted
const PROTECTED_PATHS: &[&str] = &[
    "administrator",
    "administrator/components",
    "administrator/language",
    "administrator/manifests",
    "administrator/manifests/files",
    "administrator/manifests/libraries",
    "administrator/manifests/packages",
    "administrator/modules",
    "administrator/templates",
    "api",
    "api/components",
    "api/language",
    "cli",
    "components",
    "images",
    "includes",
    "language",
    "layouts",
    "libraries",
    "media",
    "media/templates",
    "media/templates/administrator",
    "media/templates/site",
    "modules",
    "plugins",
    "templates",
    "tmp",
];

/// Suffix of an install script while it is moved aside
const STASH_SUFFIX: &str = ".extdoctor-stash";

/// What a forced removal did to one extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForcedRemoval {
    pub extension_id: i64,
    pub tables_dropped: Vec<String>,
    pub paths_removed: Vec<String>,
    pub paths_skipped: Vec<String>,
    pub record_removed: bool,
}

pub struct Remover<'a> {
    ctx: &'a AuditContext,
    uninstaller: &'a dyn Uninstaller,
}

impl<'a> Remover<'a> {
    pub fn new(ctx: &'a AuditContext, uninstaller: &'a dyn Uninstaller) -> Self {
        Self { ctx, uninstaller }
    }

    /// Uninstall through the platform
    pub fn polite(&self, ids: &[i64]) -> Result<()> {
        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                self.uninstaller.reset_adapter_cache();
            }
            info!("Uninstalling extension {}", id);
            self.uninstaller.uninstall(*id)?;
        }
        Ok(())
    }

    /// Uninstall through the platform without running the install script
    pub fn skip_scripts(&self, ids: &[i64]) -> Result<()> {
        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                self.uninstaller.reset_adapter_cache();
            }
            let record = self.record(*id)?;
            self.uninstall_without_script(&record)?;
        }
        Ok(())
    }

    /// Wipe every extension's footprint directly
    pub fn forced(&self, ids: &[i64]) -> Result<Vec<ForcedRemoval>> {
        let mut reports = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                self.uninstaller.reset_adapter_cache();
            }
            let record = self.record(*id)?;
            reports.push(self.force_remove(&record)?);
        }
        Ok(reports)
    }

    /// Remove the extension row alone, leaving files untouched
    pub fn remove_record(&self, id: i64) -> Result<()> {
        Err(Error::not_supported(format!(
            "removing the database record of extension {}",
            id
        )))
    }

    /// Forced removal of one already-built record
    pub fn force_remove(&self, record: &ExtensionRecord) -> Result<ForcedRemoval> {
        let mut report = ForcedRemoval {
            extension_id: record.id(),
            ..Default::default()
        };
        info!("Force-removing extension {} ({})", record.id(), record.element());

        for table in record.tables() {
            self.ctx.store().drop_table(table)?;
            report.tables_dropped.push(table.clone());
        }

        let paths = record
            .files()
            .iter()
            .chain(record.directories())
            .chain(record.media_paths())
            .chain(record.language_files())
            .chain(record.script_path().map(str::to_string).iter())
            .chain(record.manifest_path().map(str::to_string).iter())
            .cloned()
            .collect::<Vec<String>>();

        for path in paths {
            match self.delete_path(&path)? {
                Deletion::Removed => report.paths_removed.push(path),
                Deletion::Protected => report.paths_skipped.push(path),
                Deletion::Absent => {}
            }
        }

        match self.remove_record(record.id()) {
            Ok(()) => report.record_removed = true,
            Err(Error::NotSupported { operation }) => {
                warn!("Extension {} row kept: {} is not supported", record.id(), operation);
            }
            Err(e) => return Err(e),
        }

        Ok(report)
    }

    fn record(&self, id: i64) -> Result<Rc<ExtensionRecord>> {
        self.ctx
            .record_by_id(id)?
            .ok_or_else(|| Error::extension_not_found(id))
    }

    fn uninstall_without_script(&self, record: &ExtensionRecord) -> Result<()> {
        let paths = self.ctx.paths();
        let located = record
            .script_path()
            .filter(|script| paths.is_file(script))
            .and_then(|script| paths.resolve(script).map(|found| (script, found)));

        let Some((script, original)) = located else {
            debug!("Extension {} has no install script to skip", record.id());
            info!("Uninstalling extension {}", record.id());
            return self.uninstaller.uninstall(record.id());
        };

        let stash = Utf8PathBuf::from(format!("{}{}", original, STASH_SUFFIX));
        fs::rename(&original, &stash)?;
        debug!("Install script {} moved aside", script);

        info!("Uninstalling extension {} without its script", record.id());
        let outcome = self.uninstaller.uninstall(record.id());

        if stash.exists() {
            match original.parent() {
                Some(parent) if parent.exists() => {
                    fs::rename(&stash, &original)?;
                    debug!("Install script {} restored", script);
                }
                _ => fs::remove_file(&stash)?,
            }
        }

        outcome
    }

    fn delete_path(&self, path: &str) -> Result<Deletion> {
        if !self.ctx.paths().contains(path) {
            warn!("Refusing to delete '{}' outside the site root", path);
            return Ok(Deletion::Protected);
        }

        let relative = self.ctx.paths().relative(path);
        if is_protected_path(&relative) {
            warn!("Refusing to delete platform path '{}'", relative);
            return Ok(Deletion::Protected);
        }

        let absolute = self.ctx.paths().absolute(&relative);
        let Ok(meta) = fs::symlink_metadata(&absolute) else {
            return Ok(Deletion::Absent);
        };

        if meta.is_dir() {
            fs::remove_dir_all(&absolute)?;
        } else {
            fs::remove_file(&absolute)?;
        }
        debug!("Deleted {}", relative);
        Ok(Deletion::Removed)
    }
}

enum Deletion {
    Removed,
    Absent,
    Protected,
}

/// Platform-owned or escaping paths a forced removal must not touch
fn is_protected_path(relative: &str) -> bool {
    let trimmed = relative.trim_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|segment| segment == "..") {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    if PROTECTED_PATHS.contains(&lower.as_str()) {
        return true;
    }

    // Plugin group directories
    matches!(lower.split('/').collect::<Vec<_>>().as_slice(), ["plugins", _])
}
