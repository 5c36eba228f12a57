//! Site fixtures
//!
//! A [`SiteFixture`] is a fake platform installation in a temporary
//! directory: the site root with an installed `en-GB` locale, and an SQLite
//! database file holding the platform tables.

#![allow(dead_code)]

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use extdoctor_core::config::DoctorConfig;
use extdoctor_core::platform::{CoreExtensions, SqliteStore};
use extdoctor_core::types::{ExtensionRow, UpdateSite};
use extdoctor_extensions::AuditContext;
use extdoctor_issues::IssueManager;
use std::fs;
use tempfile::TempDir;

pub const PREFIX: &str = "jos_";

pub struct SiteFixture {
    temp_dir: TempDir,
    root: Utf8PathBuf,
    db_path: Utf8PathBuf,
    core: CoreExtensions,
}

impl SiteFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp directory")?;
        let base = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("Non UTF-8 temp path {:?}", p))?;
        let root = base.join("site");
        let db_path = base.join("site.db");

        fs::create_dir_all(&root).context("Failed to create site root")?;
        let store = SqliteStore::open(&db_path, PREFIX)?;
        store.create_schema()?;

        let fixture = Self {
            temp_dir,
            root,
            db_path,
            core: CoreExtensions::empty(),
        };

        for area in ["language", "administrator/language", "api/language"] {
            fixture.write(&format!("{}/en-GB/langmetadata.xml", area), "<metafile/>")?;
        }

        Ok(fixture)
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Write a file under the site root, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path))?;
        Ok(())
    }

    pub fn mkdir(&self, relative: &str) -> Result<()> {
        fs::create_dir_all(self.path(relative))?;
        Ok(())
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// A fresh connection to the fixture database
    pub fn store(&self) -> Result<SqliteStore> {
        Ok(SqliteStore::open(&self.db_path, PREFIX)?)
    }

    pub fn insert(&self, row: ExtensionRow) -> Result<i64> {
        Ok(self.store()?.insert_extension(&row)?)
    }

    pub fn insert_update_site(&self, extension_id: i64, location: &str, enabled: bool) -> Result<i64> {
        let site = UpdateSite {
            update_site_id: 0,
            name: format!("Updates for {}", extension_id),
            kind: "extension".to_string(),
            location: location.to_string(),
            enabled,
        };
        Ok(self.store()?.insert_update_site(extension_id, &site)?)
    }

    pub fn mark_core(&mut self, key: &str) -> Result<()> {
        self.core.insert_key(key)?;
        Ok(())
    }

    pub fn config(&self) -> DoctorConfig {
        let mut config = DoctorConfig::default();
        config.site.root = self.root.clone();
        config.site.api_enabled = true;
        config.database.path = Some(self.db_path.clone());
        config.database.prefix = PREFIX.to_string();
        config
    }

    /// A fresh audit context over the current state of the fixture
    pub fn context(&self) -> Result<AuditContext> {
        Ok(AuditContext::new(
            self.config(),
            Box::new(self.store()?),
            Box::new(self.core.clone()),
        ))
    }

    /// Issues of one extension, evaluated against a fresh context
    pub fn issues_of(&self, id: i64) -> Result<IssueManager> {
        let ctx = self.context()?;
        let record = ctx
            .record_by_id(id)?
            .with_context(|| format!("Extension {} does not exist", id))?;
        Ok(IssueManager::evaluate(&ctx, &record))
    }
}

/// Manifest XML of a component with site, admin and media sections
pub fn component_manifest(element: &str) -> String {
    let bare = element.strip_prefix("com_").unwrap_or(element);
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<extension type="component" method="upgrade">
    <name>{element}</name>
    <version>1.0.0</version>
    <scriptfile>script.php</scriptfile>
    <install>
        <sql>
            <file driver="mysql" charset="utf8">sql/install.mysql.sql</file>
            <file driver="postgresql" charset="utf8">sql/install.postgresql.sql</file>
        </sql>
    </install>
    <update>
        <schemas>
            <schemapath type="mysql">sql/updates/mysql</schemapath>
        </schemas>
    </update>
    <files folder="site">
        <folder>src</folder>
        <filename>{bare}.php</filename>
    </files>
    <languages folder="site/language">
        <language tag="en-GB">en-GB/{element}.ini</language>
        <language tag="de-DE">de-DE/{element}.ini</language>
    </languages>
    <media destination="{element}" folder="media">
        <folder>js</folder>
    </media>
    <administration>
        <files folder="admin">
            <folder>sql</folder>
            <filename>{bare}.xml</filename>
        </files>
        <languages folder="admin/language">
            <language tag="en-GB">en-GB/{element}.ini</language>
            <language tag="en-GB">en-GB/{element}.sys.ini</language>
        </languages>
    </administration>
    <updateservers>
        <server type="extension" name="{bare}">https://example.com/updates/{bare}.xml</server>
    </updateservers>
</extension>
"#
    )
}

/// Manifest XML of a package declaring the given `<file>` entries
pub fn package_manifest(element: &str, entries: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<extension type="package" method="upgrade">
    <name>{element}</name>
    <packagename>{element}</packagename>
    <files folder="packages">
        {entries}
    </files>
</extension>
"#,
        entries = entries.join("\n        ")
    )
}
