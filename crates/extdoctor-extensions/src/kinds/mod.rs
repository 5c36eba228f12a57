//! Per-type installation conventions
//!
//! Every extension type runs the same introspection sequence (see
//! [`crate::record`]); what differs is captured by one [`Conventions`]
//! implementation per type.

mod component;
mod file;
mod language;
mod library;
mod module;
mod package;
mod plugin;
mod template;

pub use package::SubExtensionCriteria;

use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::paths::join;
use extdoctor_core::types::{Client, ExtensionType};

/// Manifest path to the top-level `<languages>` block
pub(crate) const ROOT_LANGUAGES: &[&str] = &["languages"];

/// The identifying columns of an extension row
pub(crate) struct Identity<'a> {
    pub element: &'a str,
    pub folder: Option<&'a str>,
    pub client: Client,
}

pub(crate) trait Conventions {
    /// Directories and files expected without reading a manifest
    fn default_paths(&self, site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint);

    /// Areas where translations may live
    fn language_scopes(&self, _site: &Site<'_>, _id: &Identity<'_>) -> Vec<LanguageScope> {
        Vec::new()
    }

    fn default_media(&self, _site: &Site<'_>, _id: &Identity<'_>, _fp: &mut Footprint) {}

    /// Directory SQL paths in the manifest are relative to
    fn sql_base(&self, _id: &Identity<'_>) -> Option<String> {
        None
    }

    /// Candidate manifest locations, most likely first
    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String>;

    /// Directories and files declared by the manifest
    fn manifest_paths(&self, site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint);

    fn manifest_media(&self, _id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.media_paths.clear();
        for media in manifest.root().children_named("media") {
            fp.add_media_block(media);
        }
    }

    /// Directory the `<scriptfile>` is copied into
    fn script_base(&self, _id: &Identity<'_>) -> Option<String> {
        None
    }

    /// Install script location
    fn script_path(&self, _site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest) -> Option<String> {
        let script = manifest.script_file()?;
        self.script_base(id).map(|base| join(&base, script))
    }
}

/// The conventions of one extension type
pub(crate) fn conventions(kind: ExtensionType) -> &'static dyn Conventions {
    match kind {
        ExtensionType::Component => &component::Component,
        ExtensionType::Plugin => &plugin::Plugin,
        ExtensionType::Module => &module::Module,
        ExtensionType::Template => &template::Template,
        ExtensionType::Library => &library::Library,
        ExtensionType::Language => &language::Language,
        ExtensionType::File => &file::File,
        ExtensionType::Package => &package::Package,
    }
}

pub(crate) use package::subextension_criteria;

/// First existing candidate, or the first candidate when none exists
pub(crate) fn locate(site: &Site<'_>, candidates: Vec<String>) -> Option<String> {
    let existing = candidates
        .iter()
        .position(|candidate| site.paths.is_file(candidate))
        .unwrap_or(0);
    candidates.into_iter().nth(existing)
}

/// `.ini` and `.sys.ini` names for a language prefix
pub(crate) fn ini_pair(prefix: &str) -> Vec<String> {
    vec![format!("{}.ini", prefix), format!("{}.sys.ini", prefix)]
}
