//! Database-side repairs offered by issue fixes

use crate::context::AuditContext;
use crate::record::ExtensionRecord;
use extdoctor_core::error::{Error, Result};
use extdoctor_core::types::{ColumnValue, ExtensionColumn};
use tracing::info;

/// Point an extension's `package_id` at the package that declares it
///
/// Returns the new package id. Fails when no package claims the extension.
pub fn adopt(ctx: &AuditContext, record: &ExtensionRecord) -> Result<i64> {
    let Some(package_id) = ctx.adoption_index().which_package(record.id()) else {
        return Err(Error::not_supported(format!(
            "adopting extension {}: no package declares it",
            record.id()
        )));
    };

    record.set_field(ctx, ExtensionColumn::PackageId, ColumnValue::Int(package_id))?;
    info!("Extension {} adopted by package {}", record.id(), package_id);
    Ok(package_id)
}

/// Enable every update site pointing at one of the manifest's servers
///
/// Returns how many sites were switched on.
pub fn enable_canonical_update_sites(ctx: &AuditContext, record: &ExtensionRecord) -> Result<usize> {
    let servers = record.canonical_update_servers();
    let mut enabled = 0;

    for site in record.update_sites(ctx) {
        if site.enabled || !servers.iter().any(|url| site.points_at(url)) {
            continue;
        }
        ctx.store().set_update_site_enabled(site.update_site_id, true)?;
        info!(
            "Enabled update site {} ({}) of extension {}",
            site.update_site_id,
            site.location,
            record.id()
        );
        enabled += 1;
    }

    Ok(enabled)
}

/// Bring the stored schema version up to the newest shipped update
///
/// Afterwards the update cache is purged and the media version refreshed so
/// the site picks up the repaired state. Returns the version written.
pub fn fix_schema(ctx: &AuditContext, record: &ExtensionRecord) -> Result<String> {
    let Some(version) = record.newest_schema_version() else {
        return Err(Error::not_supported(format!(
            "schema fix for extension {}: no update SQL files",
            record.id()
        )));
    };

    ctx.store().set_schema_version(record.id(), &version)?;
    ctx.store().purge_update_cache()?;
    ctx.store().refresh_media_version()?;

    info!("Schema of extension {} set to {}", record.id(), version);
    Ok(version)
}
