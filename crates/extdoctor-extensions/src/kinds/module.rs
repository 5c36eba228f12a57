use super::{ini_pair, Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;

pub(crate) struct Module;

impl Module {
    fn dir(id: &Identity<'_>) -> String {
        id.client.path(&format!("modules/{}", id.element))
    }
}

impl Conventions for Module {
    fn default_paths(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_directory(&Self::dir(id));
    }

    fn language_scopes(&self, _site: &Site<'_>, id: &Identity<'_>) -> Vec<LanguageScope> {
        vec![LanguageScope {
            client: id.client,
            local_dir: Some(Self::dir(id)),
            manifest_block: ROOT_LANGUAGES,
            default_names: ini_pair(id.element),
        }]
    }

    fn default_media(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_media(&format!("media/{}", id.element));
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
