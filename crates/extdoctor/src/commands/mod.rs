//! CLI command implementations

pub mod check;
pub mod fix;
pub mod info;
pub mod list;
pub mod package;
pub mod set;
pub mod uninstall;
pub mod version;

use anyhow::{anyhow, Context, Result};
use extdoctor_core::{DoctorConfig, HierarchicalConfigLoader};
use extdoctor_extensions::{AuditContext, ExtensionRecord};
use std::rc::Rc;
use tracing::debug;

use crate::cli::SiteArgs;

/// Resolve the configuration, with command-line flags taking precedence
pub fn load_config(site: &SiteArgs) -> Result<DoctorConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to locate configuration")?;
    let mut config = loader
        .load(site.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(root) = &site.root {
        config.site.root = root.clone();
    }
    if let Some(db) = &site.db {
        config.database.path = Some(db.clone());
    }

    Ok(config)
}

/// Open an audit of the configured site
pub fn open_context(site: &SiteArgs) -> Result<AuditContext> {
    let config = load_config(site)?;
    let root = config.site.root.clone();
    debug!(
        "Auditing {} with database {:?} and prefix '{}'",
        root, config.database.path, config.database.prefix
    );
    AuditContext::open(config).with_context(|| format!("Failed to open site at {}", root))
}

/// The record of one extension, failing when the row does not exist
pub fn require_record(ctx: &AuditContext, id: i64) -> Result<Rc<ExtensionRecord>> {
    ctx.record_by_id(id)
        .with_context(|| format!("Failed to load extension {}", id))?
        .ok_or_else(|| anyhow!("Extension {} does not exist", id))
}
