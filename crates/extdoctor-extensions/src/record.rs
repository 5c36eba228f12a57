//! The extension record model
//!
//! An [`ExtensionRecord`] wraps one row of the extensions table together
//! with the footprint the extension is expected to have on disk and in the
//! database. The footprint is derived once, at construction, by the same
//! sequence for every type:
//!
//! 1. an empty element skips introspection entirely;
//! 2. convention-based directories, files, translations, media and tables;
//! 3. the manifest is located; when it is missing, unparsable or declares
//!    another type, the defaults are trimmed to what exists and kept;
//! 4. otherwise everything is re-derived from the manifest.
//!
//! Records are immutable. Remediation changes the database or the
//! filesystem; a fresh record has to be built to observe the effect.

use crate::context::AuditContext;
use crate::footprint::{
    default_language_files, manifest_language_files, manifest_tables, tables_in_dir, Footprint,
    Site,
};
use crate::kinds::{conventions, locate, subextension_criteria, Identity, SubExtensionCriteria};
use crate::manifest::Manifest;
use crate::schema::{compare_versions, newest_update_version, SchemaError};
use extdoctor_core::error::Result;
use extdoctor_core::paths::{join, PathNormalizer};
use extdoctor_core::platform::ExtensionFilter;
use extdoctor_core::types::{
    Client, ColumnValue, ExtensionColumn, ExtensionRow, ExtensionType, InstallState, UpdateSite,
};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, warn};

/// A declared package member and the record it resolved to, if any
#[derive(Debug, Clone)]
pub struct SubExtension {
    pub criteria: SubExtensionCriteria,
    pub record: Option<Rc<ExtensionRecord>>,
}

/// Which of the presence-indicating paths exist right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub any_directory: bool,
    pub all_directories: bool,
    pub any_file: bool,
    pub all_files: bool,
}

impl Presence {
    pub fn any(&self) -> bool {
        self.any_directory || self.any_file
    }

    pub fn all(&self) -> bool {
        self.all_directories && self.all_files
    }
}

/// One installable unit known to the platform
#[derive(Debug)]
pub struct ExtensionRecord {
    row: ExtensionRow,
    kind: ExtensionType,
    core: bool,
    footprint: Footprint,
    criteria: Vec<SubExtensionCriteria>,
    paths: PathNormalizer,
    subextensions: OnceCell<Vec<SubExtension>>,
}

impl ExtensionRecord {
    /// Build a record from a raw row
    ///
    /// Prefer [`AuditContext::make`], which memoizes records per row.
    pub fn build(ctx: &AuditContext, row: ExtensionRow) -> Result<Self> {
        let kind = ExtensionType::parse(&row.kind)?;
        let core = ctx
            .core()
            .is_core(kind, row.element.trim(), row.client(), row.folder());
        let (footprint, criteria) = introspect(&ctx.site(), kind, &row);

        Ok(Self {
            row,
            kind,
            core,
            footprint,
            criteria,
            paths: ctx.paths().clone(),
            subextensions: OnceCell::new(),
        })
    }

    pub fn row(&self) -> &ExtensionRow {
        &self.row
    }

    pub fn id(&self) -> i64 {
        self.row.extension_id
    }

    pub fn kind(&self) -> ExtensionType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.row.name
    }

    pub fn element(&self) -> &str {
        &self.row.element
    }

    pub fn folder(&self) -> Option<&str> {
        self.row.folder()
    }

    pub fn client(&self) -> Client {
        self.row.client()
    }

    pub fn package_id(&self) -> i64 {
        self.row.package_id
    }

    pub fn is_enabled(&self) -> bool {
        self.row.is_enabled()
    }

    pub fn is_protected(&self) -> bool {
        self.row.is_protected()
    }

    pub fn is_locked(&self) -> bool {
        self.row.is_locked()
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn directories(&self) -> &[String] {
        &self.footprint.directories
    }

    pub fn files(&self) -> &[String] {
        &self.footprint.files
    }

    pub fn language_files(&self) -> &[String] {
        &self.footprint.language_files
    }

    pub fn media_paths(&self) -> &[String] {
        &self.footprint.media_paths
    }

    pub fn tables(&self) -> &[String] {
        &self.footprint.tables
    }

    pub fn manifest_path(&self) -> Option<&str> {
        self.footprint.manifest_path.as_deref()
    }

    pub fn script_path(&self) -> Option<&str> {
        self.footprint.script_path.as_deref()
    }

    /// Update servers the manifest declares as authoritative
    pub fn canonical_update_servers(&self) -> &[String] {
        &self.footprint.update_servers
    }

    /// Whether a manifest of the right type was found and read
    pub fn has_manifest(&self) -> bool {
        self.footprint.has_manifest
    }

    pub fn is_package(&self) -> bool {
        self.kind == ExtensionType::Package
    }

    pub fn is_core(&self) -> bool {
        self.core
    }

    pub fn is_discovered(&self) -> bool {
        self.row.install_state() == InstallState::Discovered
    }

    /// Whether `path` exists, with dangling symlinks counting as absent
    pub fn file_really_exists(&self, path: &str) -> bool {
        self.paths.exists(path)
    }

    /// Existence of the presence-indicating directories and files
    ///
    /// An empty category counts as fully present and not partly present.
    pub fn presence(&self) -> Presence {
        let directories: Vec<bool> = self
            .directories()
            .iter()
            .map(|d| self.file_really_exists(d))
            .collect();
        let files: Vec<bool> = self
            .files()
            .iter()
            .map(|f| self.file_really_exists(f))
            .collect();

        Presence {
            any_directory: directories.iter().any(|e| *e),
            all_directories: directories.iter().all(|e| *e),
            any_file: files.iter().any(|e| *e),
            all_files: files.iter().all(|e| *e),
        }
    }

    /// Whether the extension's files are in place
    ///
    /// Discovered extensions count as installed: their files exist and only
    /// the database side is pending. Packages own no files and go by state.
    pub fn is_installed(&self) -> bool {
        if self.is_package() {
            return self.row.install_state() == InstallState::Installed;
        }

        self.is_discovered() || self.presence().all()
    }

    /// Some, but not all, presence-indicating paths exist
    pub fn is_partially_installed(&self) -> bool {
        if self.is_discovered() {
            return false;
        }
        let presence = self.presence();
        presence.any() && !presence.all()
    }

    /// Presence-indicating paths are declared and none of them exist
    pub fn is_leftover(&self) -> bool {
        if self.is_package() || self.is_discovered() {
            return false;
        }
        let declared = !self.directories().is_empty() || !self.files().is_empty();
        declared && !self.presence().any()
    }

    /// A declared translation file is missing
    ///
    /// Without a manifest there is nothing reliable to compare against, so
    /// the answer is always false. `only_system` restricts the check to
    /// `.sys.ini` files.
    pub fn is_missing_languages(&self, only_system: bool) -> bool {
        if !self.has_manifest() || self.language_files().is_empty() {
            return false;
        }

        self.language_files()
            .iter()
            .filter(|file| !only_system || file.ends_with(".sys.ini"))
            .any(|file| !self.file_really_exists(file))
    }

    /// No update site and no valid owning package
    pub fn is_orphan(&self, ctx: &AuditContext) -> bool {
        if self.is_package() || self.is_core() || self.is_discovered() {
            return false;
        }
        if !self.update_sites(ctx).is_empty() {
            return false;
        }

        self.package_id() == 0 || !ctx.is_package_id(self.package_id())
    }

    /// The package this extension declares as its parent
    ///
    /// `None` for packages, for a zero package id, and when the referenced
    /// row is missing or is not a package.
    pub fn parent_package(&self, ctx: &AuditContext) -> Option<Rc<ExtensionRecord>> {
        if self.is_package() || self.package_id() == 0 {
            return None;
        }

        match ctx.record_by_id(self.package_id()) {
            Ok(Some(parent)) if parent.is_package() => Some(parent),
            Ok(Some(parent)) => {
                warn!(
                    "Extension {} names {} as its package, but that is a {}",
                    self.id(),
                    parent.id(),
                    parent.kind()
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Parent package of {} unavailable: {}", self.id(), e);
                None
            }
        }
    }

    /// Update sites registered for this extension
    pub fn update_sites<'c>(&self, ctx: &'c AuditContext) -> &'c [UpdateSite] {
        ctx.update_sites_for(self.id())
    }

    /// Whether the extension has a schema baseline row
    pub fn has_schemas_entry(&self, ctx: &AuditContext) -> bool {
        ctx.schema_version(self.id()).is_some()
    }

    /// Ways the live database differs from the extension's schema baseline
    pub fn schema_errors(&self, ctx: &AuditContext) -> Vec<SchemaError> {
        let (Some(stored), Some(dir)) = (
            ctx.schema_version(self.id()),
            self.footprint.schema_path.as_deref(),
        ) else {
            return Vec::new();
        };

        let mut errors = Vec::new();

        if let Some(expected) = newest_update_version(&self.paths, dir) {
            if compare_versions(stored, &expected) != Ordering::Equal {
                errors.push(SchemaError::VersionMismatch {
                    stored: stored.to_string(),
                    expected,
                });
            }
        }

        let live = ctx.live_tables();
        for table in tables_in_dir(&self.paths, dir) {
            if !live.contains(&table) {
                errors.push(SchemaError::MissingTable { table });
            }
        }

        errors
    }

    /// Newest schema version shipped in the update SQL directory
    pub fn newest_schema_version(&self) -> Option<String> {
        let dir = self.footprint.schema_path.as_deref()?;
        newest_update_version(&self.paths, dir)
    }

    /// Write one column of this extension's row
    pub fn set_field(&self, ctx: &AuditContext, column: ExtensionColumn, value: ColumnValue) -> Result<()> {
        ctx.store().set_column(self.id(), column, &value)
    }

    /// Write one column named by text
    ///
    /// Unknown column names fail with [`Error::InvalidField`].
    pub fn set_field_name(&self, ctx: &AuditContext, name: &str, value: &str) -> Result<()> {
        let column: ExtensionColumn = name.parse()?;
        let value = column.value_from_str(value)?;
        self.set_field(ctx, column, value)
    }

    /// Sub-extensions declared in a package manifest
    pub fn subextension_criteria(&self) -> &[SubExtensionCriteria] {
        &self.criteria
    }

    /// Every declared sub-extension, resolved or not
    pub fn subextensions_with_meta(&self, ctx: &AuditContext) -> &[SubExtension] {
        self.subextensions.get_or_init(|| {
            self.criteria
                .iter()
                .map(|criteria| {
                    let record = match ctx.find_record(&criteria.query()) {
                        Ok(record) => record,
                        Err(e) => {
                            debug!("Sub-extension {:?} not resolvable: {}", criteria, e);
                            None
                        }
                    };
                    SubExtension {
                        criteria: criteria.clone(),
                        record,
                    }
                })
                .collect()
        })
    }

    /// Declared sub-extensions that exist in the extensions table
    pub fn subextensions(&self, ctx: &AuditContext) -> Vec<Rc<ExtensionRecord>> {
        self.subextensions_with_meta(ctx)
            .iter()
            .filter_map(|sub| sub.record.clone())
            .collect()
    }

    /// A declared sub-extension is not in the extensions table
    pub fn has_missing_subextensions(&self, ctx: &AuditContext) -> bool {
        self.subextensions_with_meta(ctx)
            .iter()
            .any(|sub| sub.record.is_none())
    }

    /// A declared sub-extension does not name this package as its parent
    pub fn has_extensions_to_adopt(&self, ctx: &AuditContext) -> bool {
        self.subextensions(ctx)
            .iter()
            .any(|sub| sub.package_id() != self.id())
    }

    /// An extension names this package as parent without being declared
    pub fn has_invalid_children(&self, ctx: &AuditContext) -> bool {
        if !self.is_package() {
            return false;
        }

        let declared: HashSet<i64> = self.subextensions(ctx).iter().map(|sub| sub.id()).collect();
        let filter = ExtensionFilter {
            package_id: Some(self.id()),
            ..Default::default()
        };

        match ctx.store().list_extensions(&filter) {
            Ok(children) => children
                .iter()
                .any(|child| !declared.contains(&child.extension_id)),
            Err(e) => {
                warn!("Children of package {} unavailable: {}", self.id(), e);
                false
            }
        }
    }
}

/// Derive the footprint of one row
pub(crate) fn introspect(
    site: &Site<'_>,
    kind: ExtensionType,
    row: &ExtensionRow,
) -> (Footprint, Vec<SubExtensionCriteria>) {
    let mut fp = Footprint::default();

    let element = row.element.trim();
    if element.is_empty() {
        debug!("Extension {} has no element, skipping introspection", row.extension_id);
        return (fp, Vec::new());
    }

    let id = Identity {
        element,
        folder: row.folder(),
        client: row.client(),
    };
    let conv = conventions(kind);

    conv.default_paths(site, &id, &mut fp);
    let scopes = conv.language_scopes(site, &id);
    default_language_files(site, &scopes, &mut fp);
    conv.default_media(site, &id, &mut fp);
    let sql_base = conv.sql_base(&id);
    if let Some(base) = &sql_base {
        fp.tables = tables_in_dir(site.paths, &join(base, "sql"));
    }

    fp.manifest_path = locate(site, conv.manifest_candidates(&id));
    let manifest = fp
        .manifest_path
        .as_deref()
        .and_then(|path| Manifest::load(site.paths, path))
        .filter(|manifest| {
            let declared = manifest.declared_type();
            let matches = declared.as_deref() == Some(kind.as_str());
            if !matches {
                debug!(
                    "Manifest of extension {} declares type {:?}, expected {}",
                    row.extension_id, declared, kind
                );
            }
            matches
        });

    let Some(manifest) = manifest else {
        fp.retain_existing(site.paths);
        return (fp, Vec::new());
    };

    fp.has_manifest = true;
    let criteria = match kind {
        ExtensionType::Package => subextension_criteria(&manifest),
        _ => Vec::new(),
    };

    conv.manifest_paths(site, &id, &manifest, &mut fp);
    manifest_language_files(site, &scopes, &manifest, &mut fp);
    conv.manifest_media(&id, &manifest, &mut fp);
    fp.script_path = conv.script_path(site, &id, &manifest);
    fp.update_servers = manifest.update_servers();
    match &sql_base {
        Some(base) => manifest_tables(site, base, &manifest, &mut fp),
        None => fp.tables.clear(),
    }

    (fp, criteria)
}

impl PartialEq for ExtensionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
    }
}

impl Eq for ExtensionRecord {}

