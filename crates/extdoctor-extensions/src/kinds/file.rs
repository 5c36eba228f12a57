use super::{Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::paths::{file_really_exists, normalize};
use extdoctor_core::types::Client;
use std::path::Path;

/// File-type extensions: arbitrary files dropped anywhere under the root
pub(crate) struct File;

const MANIFEST_DIR: &str = "administrator/manifests/files";

impl Conventions for File {
    fn default_paths(&self, _site: &Site<'_>, _id: &Identity<'_>, _fp: &mut Footprint) {}

    fn language_scopes(&self, _site: &Site<'_>, _id: &Identity<'_>) -> Vec<LanguageScope> {
        vec![LanguageScope {
            client: Client::Site,
            local_dir: None,
            manifest_block: ROOT_LANGUAGES,
            default_names: Vec::new(),
        }]
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        vec![format!("{}/{}.xml", MANIFEST_DIR, id.element)]
    }

    fn manifest_paths(&self, _site: &Site<'_>, _id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();

        let Some(fileset) = manifest.child("fileset") else {
            return;
        };
        // Targets are shared destinations such as `media/vendor`
        for files in fileset.children_named("files") {
            let target = files.attr("target").unwrap_or_default();
            fp.add_file_entries(target, files);
        }
    }

    fn script_path(&self, site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest) -> Option<String> {
        let script = manifest.script_file()?;

        let relative = site.paths.relative(script);
        if file_really_exists(site.paths.absolute(&relative).as_std_path()) {
            return Some(relative);
        }

        if Path::new(script).is_absolute() && file_really_exists(Path::new(script)) {
            return Some(normalize(script));
        }

        let bare = id.element.strip_prefix("files_").unwrap_or(id.element);
        let sibling = format!("{}/{}/{}", MANIFEST_DIR, bare, script);
        if site.paths.exists(&sibling) {
            return Some(sibling);
        }

        None
    }
}
