use super::{ini_pair, Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::paths::join;
use extdoctor_core::types::Client;

pub(crate) struct Library;

impl Library {
    fn dir(element: &str) -> String {
        format!("libraries/{}", element)
    }

    fn manifest_dir() -> &'static str {
        "administrator/manifests/libraries"
    }
}

impl Conventions for Library {
    fn default_paths(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_directory(&Self::dir(id.element));
    }

    fn language_scopes(&self, _site: &Site<'_>, id: &Identity<'_>) -> Vec<LanguageScope> {
        // Namespaced libraries (`vendor/name`) use `lib_vendor_name`
        vec![LanguageScope {
            client: Client::Site,
            local_dir: Some(Self::dir(id.element)),
            manifest_block: ROOT_LANGUAGES,
            default_names: ini_pair(&format!("lib_{}", id.element.replace('/', "_"))),
        }]
    }

    fn default_media(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_media(&format!("media/lib_{}", id.element.replace('/', "_")));
    }

    fn sql_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::dir(id.element))
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        vec![format!("{}/{}.xml", Self::manifest_dir(), id.element)]
    }

    fn manifest_paths(&self, _site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();

        let name = manifest.root().child_text("libraryname").unwrap_or(id.element);
        match manifest.child("files") {
            Some(files) => fp.add_file_block(&Self::dir(name), files),
            None => fp.add_directory(&Self::dir(name)),
        }
    }

    fn script_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(join(Self::manifest_dir(), id.element))
    }
}
