use super::{Conventions, Identity};
use crate::footprint::{Footprint, Site};
use crate::manifest::Manifest;

/// Language packs: one locale directory, nothing else of their own
pub(crate) struct Language;

impl Language {
    fn dir(id: &Identity<'_>) -> String {
        id.client.path(&format!("language/{}", id.element))
    }
}

impl Conventions for Language {
    fn default_paths(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_directory(&Self::dir(id));
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        let dir = Self::dir(id);
        vec![
            format!("{}/install.xml", dir),
            format!("{}/{}.xml", dir, id.element),
        ]
    }

    fn manifest_paths(&self, _site: &Site<'_>, id: &Identity<'_>, _manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();
        fp.add_directory(&Self::dir(id));
    }

    fn manifest_media(&self, _id: &Identity<'_>, _manifest: &Manifest, fp: &mut Footprint) {
        fp.media_paths.clear();
    }
}
