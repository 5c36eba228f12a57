//! Integration tests for rule detection and issue lookup

mod common;

use anyhow::Result;
use common::*;
use extdoctor_issues::Severity;

const COM_FOO_ENTRY: &str =
    r#"<file type="component" id="com_foo" client="administrator">com_foo.zip</file>"#;

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
        "administrator/components/com_foo/sql/updates/mysql/1.0.0.sql",
        "CREATE TABLE IF NOT EXISTS `#__foo_log` (`id` int);",
    )?;
    site.write("components/com_foo/foo.php", "<?php\n")?;
    site.mkdir("components/com_foo/src")?;
    site.mkdir("media/com_foo/js")?;
    site.insert(RowBuilder::component("com_foo").build())
}

#[test]
fn test_issue_lookup_accepts_any_spelling() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::component("com_gone").build())?;
    let issues = site.issues_of(id)?;

    for query in ["orphaned", "Orphaned", "ORPHANED", "extdoctor::issues::Orphaned"] {
        assert!(issues.has_issue(query), "{}", query);
    }

    let issue = issues.get_issue("orphaned").expect("orphaned issue");
    assert_eq!(issue.id, "extdoctor::issues::Orphaned");
    assert_eq!(issue.slug, "orphaned");
    assert_eq!(issue.name(), "Orphaned");
    assert!(!issues.has_issue("Discovered"));
    Ok(())
}

#[test]
fn test_leftover_component_issues() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::component("com_gone").build())?;
    let issues = site.issues_of(id)?;

    assert_eq!(issues.extension_id(), id);
    assert!(issues.has_issue("Broken"));
    assert!(issues.has_issue("Leftover"));
    assert!(issues.has_issue("NoXMLManifest"));
    assert!(!issues.has_issue("PartiallyInstalled"));
    assert_eq!(issues.highest_severity(), Some(Severity::Critical));

    // Nothing claims the extension and its files are gone
    let orphaned = issues.get_issue("Orphaned").expect("orphaned issue");
    assert_eq!(orphaned.template, "uninstall");
    assert_eq!(orphaned.actions, ["adopt", "uninstall"]);
    Ok(())
}

#[test]
fn test_issues_keep_rule_order() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::component("com_gone").build())?;
    let issues = site.issues_of(id)?;

    let names: Vec<&str> = issues.issues().iter().map(|issue| issue.name()).collect();
    let broken = names.iter().position(|n| *n == "Broken").expect("broken");
    let leftover = names.iter().position(|n| *n == "Leftover").expect("leftover");
    let orphaned = names.iter().position(|n| *n == "Orphaned").expect("orphaned");
    assert!(broken < leftover);
    assert!(leftover < orphaned);
    Ok(())
}

#[test]
fn test_plugin_with_legacy_file_is_not_partial() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("plugins/system/example.php", "<?php\n")?;
    let id = site.insert(RowBuilder::plugin("system", "example").build())?;
    let issues = site.issues_of(id)?;

    assert!(!issues.has_issue("PartiallyInstalled"));
    assert!(!issues.has_issue("Broken"));
    assert!(!issues.has_issue("Leftover"));

    // Installed, unclaimed and without update sites
    let orphaned = issues.get_issue("Orphaned").expect("orphaned issue");
    assert_eq!(orphaned.template, "rebuild_update_sites");
    Ok(())
}

#[test]
fn test_component_without_manifest_has_no_language_issue() -> Result<()> {
    let site = SiteFixture::new()?;
    site.mkdir("components/com_bare")?;
    site.mkdir("administrator/components/com_bare")?;
    let id = site.insert(RowBuilder::component("com_bare").build())?;
    let issues = site.issues_of(id)?;

    assert!(!issues.has_issue("MissingLanguage"));
    assert!(issues.has_issue("NoXMLManifest"));
    assert!(!issues.has_issue("Broken"));
    Ok(())
}

#[test]
fn test_missing_language_and_media() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;

    let issues = site.issues_of(id)?;
    assert!(issues.has_issue("MissingLanguage"));
    assert!(!issues.has_issue("MissingMedia"));
    assert!(!issues.has_issue("NoScript"));

    std::fs::remove_dir_all(site.path("media/com_foo"))?;
    std::fs::remove_file(site.path("administrator/components/com_foo/script.php"))?;
    let issues = site.issues_of(id)?;
    assert!(issues.has_issue("MissingMedia"));
    assert!(issues.has_issue("NoScript"));
    Ok(())
}

#[test]
fn test_file_script_outside_the_root_is_not_missing() -> Result<()> {
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

    assert!(!site.issues_of(id)?.has_issue("NoScript"));
    Ok(())
}

#[test]
fn test_tables_and_schema_are_mutually_exclusive() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;

    let issues = site.issues_of(id)?;
    assert!(issues.has_issue("MissingTables"));
    assert!(!issues.has_issue("SchemaOutOfDate"));

    site.store()?.insert_schema(id, "0.9.0")?;
    let issues = site.issues_of(id)?;
    assert!(!issues.has_issue("MissingTables"));
    assert!(issues.has_issue("SchemaOutOfDate"));
    Ok(())
}

#[test]
fn test_no_orphans_among_packages_and_core() -> Result<()> {
    let mut site = SiteFixture::new()?;
    site.mark_core("component:com_core")?;
    let package_id = site.insert(RowBuilder::package("pkg_alone").build())?;
    let core_id = site.insert(RowBuilder::component("com_core").build())?;

    assert!(!site.issues_of(package_id)?.has_issue("Orphaned"));
    assert!(!site.issues_of(core_id)?.has_issue("Orphaned"));
    Ok(())
}

#[test]
fn test_core_extensions_are_downgraded() -> Result<()> {
    let mut site = SiteFixture::new()?;
    site.mark_core("component:com_core")?;
    let core_id = site.insert(RowBuilder::component("com_core").build())?;
    let other_id = site.insert(RowBuilder::component("com_other").build())?;

    let core = site.issues_of(core_id)?;
    let other = site.issues_of(other_id)?;
    assert_eq!(
        core.get_issue("Broken").map(|issue| issue.severity),
        Some(Severity::Debug)
    );
    assert_eq!(
        other.get_issue("Broken").map(|issue| issue.severity),
        Some(Severity::Critical)
    );
    Ok(())
}

#[test]
fn test_flag_rules() -> Result<()> {
    let mut site = SiteFixture::new()?;
    site.mark_core("library:joomla")?;
    site.mark_core("library:phpass")?;
    let protected = site.insert(RowBuilder::library("vendor").protected().locked().build())?;
    let core_off = site.insert(RowBuilder::library("joomla").protected().disabled().build())?;
    let core_on = site.insert(RowBuilder::library("phpass").protected().build())?;

    let issues = site.issues_of(protected)?;
    assert!(issues.has_issue("NonCoreProtected"));
    assert!(issues.has_issue("NonCoreLocked"));
    assert!(!issues.has_issue("CoreForceDisabled"));

    let issues = site.issues_of(core_off)?;
    assert!(issues.has_issue("CoreForceDisabled"));
    assert!(!issues.has_issue("NonCoreProtected"));

    assert!(!site.issues_of(core_on)?.has_issue("CoreForceDisabled"));
    Ok(())
}

#[test]
fn test_package_membership_rules() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "administrator/manifests/packages/pkg_foo.xml",
        &package_manifest("pkg_foo", &[COM_FOO_ENTRY]),
    )?;
    let owner = site.insert(RowBuilder::package("pkg_foo").build())?;
    let other = site.insert(RowBuilder::package("pkg_other").build())?;
    let component = site.insert(RowBuilder::component("com_foo").package_id(other).build())?;

    // Only packages are reported with the wrong parent
    assert!(!site.issues_of(component)?.has_issue("WrongParent"));

    let issues = site.issues_of(owner)?;
    assert!(!issues.has_issue("MissingChildren"));

    site.insert(RowBuilder::module("mod_stowaway", 0).package_id(owner).build())?;
    let issues = site.issues_of(owner)?;
    assert!(issues.has_issue("InvalidChildren"));
    Ok(())
}

#[test]
fn test_nested_package_with_wrong_parent() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "administrator/manifests/packages/pkg_suite.xml",
        &package_manifest(
            "pkg_suite",
            &[r#"<file type="package" id="pkg_inner">pkg_inner.zip</file>"#],
        ),
    )?;
    site.insert(RowBuilder::package("pkg_suite").build())?;
    let other = site.insert(RowBuilder::package("pkg_other").build())?;
    let inner = site.insert(RowBuilder::package("pkg_inner").package_id(other).build())?;

    let issues = site.issues_of(inner)?;
    let wrong = issues.get_issue("WrongParent").expect("wrong parent issue");
    assert_eq!(wrong.actions, ["default", "adopt"]);
    assert_eq!(wrong.severity, Severity::Error);
    Ok(())
}

#[test]
fn test_package_with_missing_children() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "administrator/manifests/packages/pkg_foo.xml",
        &package_manifest("pkg_foo", &[COM_FOO_ENTRY]),
    )?;
    let package_id = site.insert(RowBuilder::package("pkg_foo").build())?;

    let issues = site.issues_of(package_id)?;
    assert!(issues.has_issue("MissingChildren"));
    assert!(!issues.has_issue("Broken"));
    Ok(())
}

#[test]
fn test_update_site_rules() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = install_com_foo(&site)?;
    site.insert_update_site(id, "https://example.com/updates/foo.xml", false)?;

    let issues = site.issues_of(id)?;
    assert!(issues.has_issue("DisabledUpdateSite"));
    assert!(!issues.has_issue("WrongUpdateSite"));
    assert!(!issues.has_issue("Orphaned"));

    site.insert_update_site(id, "https://mirror.example.org/foo.xml", true)?;
    let issues = site.issues_of(id)?;
    assert!(issues.has_issue("DisabledUpdateSite"));
    assert!(issues.has_issue("WrongUpdateSite"));
    Ok(())
}

#[test]
fn test_discovered_extension() -> Result<()> {
    let site = SiteFixture::new()?;
    let id = site.insert(RowBuilder::module("mod_new", 0).discovered().build())?;
    let issues = site.issues_of(id)?;

    let discovered = issues.get_issue("Discovered").expect("discovered issue");
    assert_eq!(discovered.severity, Severity::Debug);
    assert!(!issues.has_issue("Broken"));
    assert!(!issues.has_issue("Orphaned"));
    Ok(())
}
