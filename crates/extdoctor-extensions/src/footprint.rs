//! The on-disk and in-database footprint an extension is expected to have

use crate::manifest::{Manifest, XmlElement};
use extdoctor_core::paths::{join, normalize, PathNormalizer};
use extdoctor_core::sql::create_table_names;
use extdoctor_core::types::Client;
use extdoctor_core::LanguageCatalog;
use serde::Serialize;
use tracing::debug;

/// Site facts the per-type conventions derive paths from
pub(crate) struct Site<'a> {
    pub paths: &'a PathNormalizer,
    pub languages: &'a LanguageCatalog,
    pub driver: &'a str,
    pub api_enabled: bool,
}

/// Everything an extension should have installed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Footprint {
    /// Directories whose presence indicates the extension is installed
    pub directories: Vec<String>,
    /// Files whose presence indicates the extension is installed
    pub files: Vec<String>,
    pub language_files: Vec<String>,
    pub media_paths: Vec<String>,
    pub manifest_path: Option<String>,
    pub script_path: Option<String>,
    /// Table names without the prefix
    pub tables: Vec<String>,
    /// Update servers declared in the manifest
    pub update_servers: Vec<String>,
    /// Directory holding the update SQL files for the configured driver
    pub schema_path: Option<String>,
    /// Whether a manifest of the right type was found and used
    pub has_manifest: bool,
}

impl Footprint {
    pub(crate) fn add_directory(&mut self, path: &str) {
        push_unique(&mut self.directories, path);
    }

    pub(crate) fn add_file(&mut self, path: &str) {
        push_unique(&mut self.files, path);
    }

    pub(crate) fn add_media(&mut self, path: &str) {
        push_unique(&mut self.media_paths, path);
    }

    /// Add one or both of two interchangeable locations
    ///
    /// Both are added when neither exists; otherwise only the existing ones.
    pub(crate) fn add_alternatives(list: &mut Vec<String>, paths: &PathNormalizer, a: &str, b: &str) {
        let (a_exists, b_exists) = (paths.exists(a), paths.exists(b));

        if a_exists || !b_exists {
            push_unique(list, a);
        }
        if b_exists || !a_exists {
            push_unique(list, b);
        }
    }

    /// Files, directories and manifest-declared base folders of a `<files>`-style block
    pub(crate) fn add_file_block(&mut self, base: &str, block: &XmlElement) {
        self.add_directory(base);
        self.add_file_entries(base, block);
    }

    /// The `<folder>`, `<filename>` and `<file>` children of a block, under `base`
    ///
    /// `base` itself is not claimed.
    pub(crate) fn add_file_entries(&mut self, base: &str, block: &XmlElement) {
        for child in &block.children {
            if child.text.is_empty() {
                continue;
            }
            match child.name.as_str() {
                "folder" => self.add_directory(&join(base, &child.text)),
                "filename" | "file" => self.add_file(&join(base, &child.text)),
                _ => {}
            }
        }
    }

    /// Media paths of a `<media>` block
    pub(crate) fn add_media_block(&mut self, block: &XmlElement) {
        if let Some(destination) = block.attr("destination") {
            self.add_media(&join("media", destination));
            return;
        }

        for child in &block.children {
            if matches!(child.name.as_str(), "folder" | "filename" | "file") && !child.text.is_empty() {
                self.add_media(&join("media", &child.text));
            }
        }
    }

    /// Trim default-derived paths down to what exists right now
    ///
    /// Unlike translations and media, directories and files are not trimmed
    /// to nothing: when none of them exists the default directories are kept
    /// on purpose, so a vanished extension still reads as missing instead of
    /// as an extension without a footprint.
    pub(crate) fn retain_existing(&mut self, paths: &PathNormalizer) {
        let directories: Vec<String> = self
            .directories
            .iter()
            .filter(|p| paths.exists(p))
            .cloned()
            .collect();
        let files: Vec<String> = self.files.iter().filter(|p| paths.exists(p)).cloned().collect();

        if directories.is_empty() && files.is_empty() {
            self.files.clear();
        } else {
            self.directories = directories;
            self.files = files;
        }

        self.language_files.retain(|p| paths.exists(p));
        self.media_paths.retain(|p| paths.exists(p));
    }
}

/// Where an extension's translations live for one application area
pub(crate) struct LanguageScope {
    pub client: Client,
    /// Extension-local base directory, `None` if translations are only shared
    pub local_dir: Option<String>,
    /// Element path from the manifest root to the `<languages>` block
    pub manifest_block: &'static [&'static str],
    /// File names expected for every installed locale
    pub default_names: Vec<String>,
}

impl LanguageScope {
    fn candidates(&self, list: &mut Vec<String>, paths: &PathNormalizer, tag: &str, name: &str) {
        let shared = self.client.path(&format!("language/{}/{}", tag, name));

        match &self.local_dir {
            Some(local) => {
                let local = format!("{}/language/{}/{}", local, tag, name);
                Footprint::add_alternatives(list, paths, &local, &shared);
            }
            None => push_unique(list, &shared),
        }
    }
}

/// Convention-derived translation files for every installed locale
pub(crate) fn default_language_files(site: &Site<'_>, scopes: &[LanguageScope], fp: &mut Footprint) {
    for scope in scopes {
        for tag in site.languages.tags(scope.client) {
            for name in &scope.default_names {
                scope.candidates(&mut fp.language_files, site.paths, tag, name);
            }
        }
    }
}

/// Translation files declared in the manifest, limited to installed locales
pub(crate) fn manifest_language_files(
    site: &Site<'_>,
    scopes: &[LanguageScope],
    manifest: &Manifest,
    fp: &mut Footprint,
) {
    let mut files = Vec::new();

    for scope in scopes {
        let Some(block) = descend(manifest.root(), scope.manifest_block) else {
            continue;
        };

        for language in block.children_named("language") {
            let Some(tag) = language.attr("tag") else {
                continue;
            };
            if !site.languages.is_installed(scope.client, tag) {
                continue;
            }
            let name = basename(&language.text);
            if name.is_empty() {
                continue;
            }
            scope.candidates(&mut files, site.paths, tag, name);
        }
    }

    fp.language_files = files;
}

/// Tables created by the `.sql` files directly inside `dir`
pub(crate) fn tables_in_dir(paths: &PathNormalizer, dir: &str) -> Vec<String> {
    let mut tables = Vec::new();

    for name in paths.list_dir(dir) {
        if !name.to_ascii_lowercase().ends_with(".sql") {
            continue;
        }
        tables_in_file(paths, &join(dir, &name), &mut tables);
    }

    tables
}

pub(crate) fn tables_in_file(paths: &PathNormalizer, file: &str, tables: &mut Vec<String>) {
    match paths.read_to_string(file) {
        Some(sql) => {
            for table in create_table_names(&sql) {
                push_unique(tables, &table);
            }
        }
        None => debug!("Skipping unreadable SQL file {}", file),
    }
}

/// Tables from the manifest's install and update SQL declarations
///
/// Also records the update schema directory for the configured driver.
pub(crate) fn manifest_tables(site: &Site<'_>, base: &str, manifest: &Manifest, fp: &mut Footprint) {
    let mut tables = Vec::new();

    if let Some(sql) = manifest.child("install").and_then(|install| install.child("sql")) {
        for file in sql.children_named("file") {
            let driver_ok = file
                .attr("driver")
                .map_or(true, |driver| driver_matches(driver, site.driver));
            if driver_ok && !file.text.is_empty() {
                tables_in_file(site.paths, &join(base, &file.text), &mut tables);
            }
        }
    }

    fp.schema_path = None;
    if let Some(schemas) = manifest.child("update").and_then(|update| update.child("schemas")) {
        for schema_path in schemas.children_named("schemapath") {
            let driver_ok = schema_path
                .attr("type")
                .map_or(false, |driver| driver_matches(driver, site.driver));
            if driver_ok && !schema_path.text.is_empty() {
                let dir = join(base, &schema_path.text);
                for table in tables_in_dir(site.paths, &dir) {
                    push_unique(&mut tables, &table);
                }
                fp.schema_path = Some(dir);
                break;
            }
        }
    }

    fp.tables = tables;
}

/// Whether a manifest driver name belongs to the configured driver's family
pub fn driver_matches(declared: &str, configured: &str) -> bool {
    fn family(driver: &str) -> String {
        match driver.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mysqli" | "pdomysql" => "mysql".to_string(),
            "postgresql" | "postgres" | "pgsql" => "postgresql".to_string(),
            other => other.to_string(),
        }
    }

    family(declared) == family(configured)
}

fn descend<'a>(root: &'a XmlElement, path: &[&str]) -> Option<&'a XmlElement> {
    path.iter().try_fold(root, |element, name| element.child(name))
}

fn basename(path: &str) -> &str {
    let path = path.trim().trim_end_matches(['/', '\\']);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

pub(crate) fn push_unique(list: &mut Vec<String>, path: &str) {
    let path = normalize(path);
    if !path.is_empty() && !list.contains(&path) {
        list.push(path);
    }
}
