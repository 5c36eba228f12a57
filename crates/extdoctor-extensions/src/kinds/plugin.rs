use super::{ini_pair, Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::types::Client;

pub(crate) struct Plugin;

impl Plugin {
    fn dir(id: &Identity<'_>) -> String {
        format!("plugins/{}/{}", id.folder.unwrap_or_default(), id.element)
    }
}

impl Conventions for Plugin {
    fn default_paths(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_directory(&Self::dir(id));
        // Pre-manifest plugins were a single file next to the group folder
        fp.add_file(&format!("plugins/{}/{}.php", id.folder.unwrap_or_default(), id.element));
    }

    fn language_scopes(&self, _site: &Site<'_>, id: &Identity<'_>) -> Vec<LanguageScope> {
        vec![LanguageScope {
            client: Client::Administrator,
            local_dir: Some(Self::dir(id)),
            manifest_block: ROOT_LANGUAGES,
            default_names: ini_pair(&format!(
                "plg_{}_{}",
                id.folder.unwrap_or_default(),
                id.element
            )),
        }]
    }

    fn default_media(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_media(&format!(
            "media/plg_{}_{}",
            id.folder.unwrap_or_default(),
            id.element
        ));
    }

    fn sql_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::dir(id))
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        vec![format!("{}/{}.xml", Self::dir(id), id.element)]
    }

    fn manifest_paths(&self, _site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();

        match manifest.child("files") {
            Some(files) => fp.add_file_block(&Self::dir(id), files),
            None => fp.add_directory(&Self::dir(id)),
        }
    }

    fn script_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::dir(id))
    }
}
