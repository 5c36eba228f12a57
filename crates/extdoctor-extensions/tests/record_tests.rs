//! Integration tests for extension record introspection
//!
//! Each test lays out a fake site, seeds the extensions table and builds
//! records through a fresh audit context.

mod common;

use anyhow::Result;
use common::*;
use extdoctor_core::types::ExtensionType;
use extdoctor_core::Error;
use std::rc::Rc;

const SQL_ITEMS: &str = "CREATE TABLE IF NOT EXISTS `#__foo_items` (\n  `id` int NOT NULL\n);\n";
const SQL_LOG: &str = "CREATE TABLE IF NOT EXISTS `#__foo_log` (`id` int);\n";

fn install_com_foo(site: &SiteFixture) -> Result<i64> {
    site.write(
        "administrator/components/com_foo/foo.xml",
        &component_manifest("com_foo"),
    )?;
    site.write("administrator/components/com_foo/sql/install.mysql.sql", SQL_ITEMS)?;
    site.write(
        "administrator/components/com_foo/sql/install.postgresql.sql",
        "CREATE TABLE \"#__foo_pg_only\" (id integer);",
    )?;
    site.write("administrator/components/com_foo/sql/updates/mysql/1.0.0.sql", SQL_LOG)?;
    site.insert(RowBuilder::component("com_foo").build())
}

#[test]
fn test_plugin_legacy_file_satisfies_installation() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("plugins/system/example.php", "<?php\n")?;
    let id = site.insert(RowBuilder::plugin("system", "example").build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("plugin row exists");

    assert_eq!(record.kind(), ExtensionType::Plugin);
    assert!(!record.has_manifest());
    assert!(record.directories().is_empty());
    assert_eq!(record.files(), ["plugins/system/example.php"]);
    assert!(record.is_installed());
    assert!(!record.is_partially_installed());
    assert!(!record.is_leftover());
    Ok(())
}

#[test]
fn test_component_without_manifest_uses_filtered_defaults() -> Result<()> {
    let site = SiteFixture::new()?;
    site.mkdir("components/com_bare")?;
    site.mkdir("administrator/components/com_bare")?;
    let id = site.insert(RowBuilder::component("com_bare").build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");

    assert!(!record.has_manifest());
    let manifest = record.manifest_path().expect("conventional manifest path");
    assert_eq!(manifest, "administrator/components/com_bare/bare.xml");
    assert!(!record.file_really_exists(manifest));

    assert_eq!(
        record.directories(),
        ["components/com_bare", "administrator/components/com_bare"]
    );
    assert!(record.language_files().is_empty());
    assert!(!record.is_missing_languages(false));
    assert!(record.is_installed());
    Ok(())
}

#[test]
fn test_component_without_anything_is_leftover() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::component("com_gone").build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");

    assert_eq!(record.directories().len(), 3);
    assert!(record.files().is_empty());
    assert!(!record.is_installed());
    assert!(record.is_leftover());
    assert!(!record.is_partially_installed());
    Ok(())
}

#[test]
fn test_component_manifest_footprint() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");

    assert!(record.has_manifest());
    assert_eq!(
        record.manifest_path(),
        Some("administrator/components/com_foo/foo.xml")
    );
    assert_eq!(
        record.directories(),
        [
            "components/com_foo",
            "components/com_foo/src",
            "administrator/components/com_foo",
            "administrator/components/com_foo/sql",
        ]
    );
    assert_eq!(
        record.files(),
        [
            "components/com_foo/foo.php",
            "administrator/components/com_foo/foo.xml",
        ]
    );
    assert_eq!(record.media_paths(), ["media/com_foo"]);
    assert_eq!(record.tables(), ["foo_items", "foo_log"]);
    assert_eq!(
        record.script_path(),
        Some("administrator/components/com_foo/script.php")
    );
    assert_eq!(
        record.canonical_update_servers(),
        ["https://example.com/updates/foo.xml"]
    );

    // de-DE is not installed, so only en-GB entries are expected
    assert!(record.language_files().iter().all(|f| f.contains("en-GB")));
    assert_eq!(record.language_files().len(), 6);
    Ok(())
}

#[test]
fn test_partial_installation() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    site.mkdir("components/com_foo")?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");

    assert!(!record.is_installed());
    assert!(record.is_partially_installed());
    assert!(!record.is_leftover());

    site.mkdir("components/com_foo/src")?;
    site.write("components/com_foo/foo.php", "<?php\n")?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(record.is_installed());
    assert!(!record.is_partially_installed());
    Ok(())
}

#[test]
fn test_language_alternatives_keep_existing_location() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    site.write("components/com_foo/language/en-GB/com_foo.ini", "X=\"x\"\n")?;
    site.write("administrator/language/en-GB/com_foo.ini", "X=\"x\"\n")?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    let files = record.language_files();

    assert!(files.contains(&"components/com_foo/language/en-GB/com_foo.ini".to_string()));
    assert!(!files.contains(&"language/en-GB/com_foo.ini".to_string()));

    assert!(files.contains(&"administrator/language/en-GB/com_foo.ini".to_string()));
    assert!(!files.contains(
        &"administrator/components/com_foo/language/en-GB/com_foo.ini".to_string()
    ));

    // Neither sys.ini location exists, so both are reported
    assert!(files.contains(&"administrator/language/en-GB/com_foo.sys.ini".to_string()));
    assert!(files.contains(
        &"administrator/components/com_foo/language/en-GB/com_foo.sys.ini".to_string()
    ));
    Ok(())
}

#[test]
fn test_missing_languages() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(record.is_missing_languages(false));
    assert!(record.is_missing_languages(true));

    site.write("administrator/language/en-GB/com_foo.sys.ini", "X=\"x\"\n")?;
    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("component row exists");
    assert!(record.is_missing_languages(false));
    assert!(!record.is_missing_languages(true));
    Ok(())
}

#[test]
fn test_manifest_of_wrong_type_is_ignored() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "plugins/content/mixup/mixup.xml",
        r#"<extension type="module"><files><filename>mixup.php</filename></files></extension>"#,
    )?;
    let id = site.insert(RowBuilder::plugin("content", "mixup").build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("plugin row exists");

    assert!(!record.has_manifest());
    assert_eq!(record.directories(), ["plugins/content/mixup"]);
    assert!(record.is_installed());
    Ok(())
}

#[test]
fn test_discovered_counts_as_installed() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::module("mod_new", 0).discovered().build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("module row exists");

    assert!(record.is_discovered());
    assert!(record.is_installed());
    assert!(!record.is_partially_installed());
    assert!(!record.is_leftover());
    Ok(())
}

#[test]
fn test_package_installation_follows_state() -> Result<()> {
    let site = SiteFixture::new()?;
    let installed = site.insert(RowBuilder::package("pkg_ok").build())?;
    let broken = site.insert(RowBuilder::package("pkg_broken").state(1).build())?;

    let ctx = site.context()?;
    assert!(ctx.record_by_id(installed)?.expect("package").is_installed());
    assert!(!ctx.record_by_id(broken)?.expect("package").is_installed());
    assert!(!ctx.record_by_id(broken)?.expect("package").is_leftover());
    Ok(())
}

#[test]
fn test_records_are_memoized_per_row() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::library("foo").build())?;

    let ctx = site.context()?;
    let first = ctx.record_by_id(id)?.expect("library row exists");
    let second = ctx.record_by_id(id)?.expect("library row exists");
    assert!(Rc::ptr_eq(&first, &second));
    Ok(())
}

#[test]
fn test_unsupported_type_is_an_error() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::raw("widget", "foo").build())?;

    let ctx = site.context()?;
    let err = ctx.record_by_id(id).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType { .. }));
    Ok(())
}

#[test]
fn test_set_field_name() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::module("mod_foo", 0).build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("module row exists");
    assert!(record.is_enabled());

    let err = record.set_field_name(&ctx, "no_such_column", "1").unwrap_err();
    assert!(matches!(err, Error::InvalidField { .. }));

    record.set_field_name(&ctx, "enabled", "0")?;
    // The record itself is a snapshot
    assert!(record.is_enabled());

    let fresh = site.context()?.record_by_id(id)?.expect("module row exists");
    assert!(!fresh.is_enabled());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_file_really_exists_with_symlinks() -> Result<()> {
    use std::os::unix::fs::symlink;

    let site = SiteFixture::new()?;
    site.write("media/real.txt", "x")?;
    symlink(site.path("media/real.txt"), site.path("media/good-link"))?;
    symlink(site.path("media/missing.txt"), site.path("media/dangling-link"))?;
    let id = site.insert(RowBuilder::library("foo").build())?;

    let ctx = site.context()?;
    let record = ctx.record_by_id(id)?.expect("library row exists");

    assert!(record.file_really_exists("media/real.txt"));
    assert!(record.file_really_exists("media/good-link"));
    assert!(!record.file_really_exists("media/dangling-link"));
    assert!(!record.file_really_exists("media/missing.txt"));
    Ok(())
}
