//! Integration tests for remediation helpers and uninstall workflows

mod common;

use anyhow::Result;
use common::*;
use extdoctor_core::platform::ExtensionStore;
use extdoctor_core::Error;
use extdoctor_extensions::remediation::{adopt, enable_canonical_update_sites, fix_schema};
use extdoctor_extensions::{Remover, SchemaError};

const COM_FOO_ENTRY: &str =
    r#"<file type="component" id="com_foo" client="administrator">com_foo.zip</file>"#;
const CANONICAL: &str = "https://example.com/updates/foo.xml";

fn install_com_foo(site: &SiteFixture) -> Result<i64> {
    site.write(
        "administrator/components/com_foo/foo.xml",
        &component_manifest("com_foo"),
    )?;
    site.write("administrator/components/com_foo/script.php", "<?php\n")?;
    site.write(
        "administrator/components/com_foo/sql/install.mysql.sql",
        "CREATE TABLE IF NOT EXISTS `#__foo_items` (`id` int);",
    )?;
    site.write(
        "administrator/components/com_foo/sql/updates/mysql/0.9.0.sql",
        "ALTER TABLE `#__foo_items` ADD COLUMN `title` text;",
    )?;
    site.write(
        "administrator/components/com_foo/sql/updates/mysql/1.0.0.sql",
        "CREATE TABLE IF NOT EXISTS `#__foo_log` (`id` int);",
    )?;
    site.write("components/com_foo/foo.php", "<?php\n")?;
    site.mkdir("components/com_foo/src")?;
    site.mkdir("media/com_foo/js")?;
    site.insert(RowBuilder::component("com_foo").build())
}

#[test]
fn test_adopt_sets_owning_package() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "administrator/manifests/packages/pkg_foo.xml",
        &package_manifest("pkg_foo", &[COM_FOO_ENTRY]),
    )?;
    let package_id = site.insert(RowBuilder::package("pkg_foo").build())?;
    let component_id = install_com_foo(&site)?;

    let ctx = site.context()?;
    let component = ctx.record_by_id(component_id)?.expect("component row exists");
    assert_eq!(adopt(&ctx, &component)?, package_id);

    let fresh = site.context()?.record_by_id(component_id)?.expect("component row exists");
    assert_eq!(fresh.package_id(), package_id);
    Ok(())
}

#[test]
fn test_adopt_without_owner_fails() -> Result<()> {
    let site = SiteFixture::new()?;
    let component_id = install_com_foo(&site)?;

    let ctx = site.context()?;
    let component = ctx.record_by_id(component_id)?.expect("component row exists");
    let err = adopt(&ctx, &component).unwrap_err();
    assert!(matches!(err, Error::NotSupported { .. }));
    Ok(())
}

#[test]
fn test_enable_canonical_update_sites() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    site.insert_update_site(id, CANONICAL, false)?;
    site.insert_update_site(id, "https://mirror.example.org/foo.xml", false)?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert_eq!(enable_canonical_update_sites(&ctx, &record)?, 1);

    let ctx = site.context()?;
    let sites = ctx.update_sites_for(id);
    assert_eq!(sites.len(), 2);
    assert!(sites.iter().any(|s| s.points_at(CANONICAL) && s.enabled));
    assert!(sites.iter().any(|s| !s.points_at(CANONICAL) && !s.enabled));
    Ok(())
}

#[test]
fn test_schema_errors_and_fix() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    let store = site.store()?;
    store.insert_schema(id, "0.9.0")?;
    store.create_table("foo_items")?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(record.has_schemas_entry(&ctx));
    assert_eq!(record.newest_schema_version().as_deref(), Some("1.0.0"));

    let errors = record.schema_errors(&ctx);
    assert_eq!(
        errors,
        vec![
            SchemaError::VersionMismatch {
                stored: "0.9.0".to_string(),
                expected: "1.0.0".to_string(),
            },
            SchemaError::MissingTable {
                table: "foo_log".to_string(),
            },
        ]
    );

    assert_eq!(fix_schema(&ctx, &record)?, "1.0.0");
    assert_eq!(
        store.schema_versions()?.get(&id).map(String::as_str),
        Some("1.0.0")
    );
    assert_eq!(store.cached_update_count()?, 0);

    store.create_table("foo_log")?;
    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(record.schema_errors(&ctx).is_empty());
    Ok(())
}

#[test]
fn test_no_schema_entry_means_no_schema_errors() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(!record.has_schemas_entry(&ctx));
    assert!(record.schema_errors(&ctx).is_empty());
    Ok(())
}

#[test]
fn test_polite_resets_adapter_cache_between_uninstalls() -> Result<()> {
    let site = SiteFixture::new()?;
    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new();

    Remover::new(&ctx, &uninstaller).polite(&[12, 7])?;

    assert_eq!(
        uninstaller.calls(),
        vec![
            UninstallCall::Uninstall(12),
            UninstallCall::ResetCache,
            UninstallCall::Uninstall(7),
        ]
    );
    Ok(())
}

#[test]
fn test_first_failure_stops_the_batch() -> Result<()> {
    let site = SiteFixture::new()?;
    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new().failing_on(12);

    let err = Remover::new(&ctx, &uninstaller)
        .polite(&[12, 7])
        .unwrap_err();

    assert!(matches!(err, Error::Uninstall { id: 12, .. }));
    assert_eq!(uninstaller.uninstalled(), vec![12]);
    Ok(())
}

#[test]
fn test_skip_scripts_moves_script_aside() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    let script = site.path("administrator/components/com_foo/script.php");

    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new().watching(script.clone());
    Remover::new(&ctx, &uninstaller).skip_scripts(&[id])?;

    assert_eq!(uninstaller.uninstalled(), vec![id]);
    assert_eq!(uninstaller.watched_present(), vec![false]);
    assert!(script.exists());
    Ok(())
}

#[test]
fn test_skip_scripts_restores_script_on_failure() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    let script = site.path("administrator/components/com_foo/script.php");

    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new().failing_on(id);
    assert!(Remover::new(&ctx, &uninstaller).skip_scripts(&[id]).is_err());
    assert!(script.exists());
    Ok(())
}

#[test]
fn test_forced_removal_wipes_footprint() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    site.store()?.create_table("foo_items")?;

    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new();
    let reports = Remover::new(&ctx, &uninstaller).forced(&[id])?;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.extension_id, id);
    assert_eq!(report.tables_dropped, vec!["foo_items", "foo_log"]);
    assert!(report.paths_skipped.is_empty());
    assert!(!report.record_removed);
    assert!(uninstaller.uninstalled().is_empty());

    assert!(!site.exists("components/com_foo"));
    assert!(!site.exists("administrator/components/com_foo"));
    assert!(!site.exists("media/com_foo"));
    assert!(site.exists("media"));
    assert!(!site.store()?.live_tables()?.contains(&"foo_items".to_string()));

    // The row itself stays behind
    assert!(site.context()?.record_by_id(id)?.is_some());
    Ok(())
}

#[test]
fn test_forced_removal_of_file_extension_spares_shared_target() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "administrator/manifests/files/files_vendorjs.xml",
        r#"<extension type="file" method="upgrade">
    <name>files_vendorjs</name>
    <fileset>
        <files target="media/vendor">
            <filename>foo.js</filename>
            <folder>foo</folder>
        </files>
    </fileset>
</extension>"#,
    )?;
    site.write("media/vendor/foo.js", "")?;
    site.write("media/vendor/foo/foo.min.js", "")?;
    site.write("media/vendor/jquery/jquery.min.js", "")?;
    let id = site.insert(RowBuilder::file("files_vendorjs").build())?;

    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new();
    let reports = Remover::new(&ctx, &uninstaller).forced(&[id])?;

    let report = &reports[0];
    assert!(!report.paths_removed.contains(&"media/vendor".to_string()));
    assert!(!site.exists("media/vendor/foo.js"));
    assert!(!site.exists("media/vendor/foo"));
    assert!(!site.exists("administrator/manifests/files/files_vendorjs.xml"));
    assert!(site.exists("media/vendor/jquery/jquery.min.js"));
    Ok(())
}

#[test]
fn test_forced_removal_leaves_scripts_outside_the_root() -> Result<()> {
    let site = SiteFixture::new()?;
    let outside = tempfile::TempDir::new()?;
    let script = outside.path().join("setup.php");
    std::fs::write(&script, "<?php\n")?;
    let script = script.to_str().expect("temp path is UTF-8").to_string();

    site.write(
        "administrator/manifests/files/files_tools.xml",
        &format!(
            r#"<extension type="file"><name>files_tools</name><scriptfile>{}</scriptfile></extension>"#,
            script
        ),
    )?;
    let id = site.insert(RowBuilder::file("files_tools").build())?;

    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new();
    let reports = Remover::new(&ctx, &uninstaller).forced(&[id])?;

    assert_eq!(reports[0].paths_skipped, vec![script.clone()]);
    assert!(std::path::Path::new(&script).exists());
    Ok(())
}

#[test]
fn test_remove_record_is_not_supported() -> Result<()> {
    let site = SiteFixture::new()?;
    let ctx = site.context()?;
    let uninstaller = RecordingUninstaller::new();

    let err = Remover::new(&ctx, &uninstaller).remove_record(1).unwrap_err();
    assert!(matches!(err, Error::NotSupported { .. }));
    Ok(())
}
