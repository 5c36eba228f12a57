use super::{ini_pair, Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::types::Client;

pub(crate) struct Template;

impl Template {
    /// Template name without the `tpl_` prefix some rows carry
    fn name<'a>(id: &Identity<'a>) -> &'a str {
        id.element.strip_prefix("tpl_").unwrap_or(id.element)
    }

    fn area(id: &Identity<'_>) -> Client {
        match id.client {
            Client::Administrator => Client::Administrator,
            _ => Client::Site,
        }
    }

    fn dir(id: &Identity<'_>) -> String {
        Self::area(id).path(&format!("templates/{}", Self::name(id)))
    }
}

impl Conventions for Template {
    fn default_paths(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_directory(&Self::dir(id));
    }

    fn language_scopes(&self, _site: &Site<'_>, id: &Identity<'_>) -> Vec<LanguageScope> {
        vec![LanguageScope {
            client: Self::area(id),
            local_dir: Some(Self::dir(id)),
            manifest_block: ROOT_LANGUAGES,
            default_names: ini_pair(&format!("tpl_{}", Self::name(id))),
        }]
    }

    fn default_media(&self, site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        // Templates installed before the media split keep their assets in
        // the template folder itself
        let modern = format!("media/templates/{}/{}", Self::area(id), Self::name(id));
        let legacy = Self::dir(id);
        Footprint::add_alternatives(&mut fp.media_paths, site.paths, &modern, &legacy);
    }

    fn sql_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::dir(id))
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        vec![format!("{}/templateDetails.xml", Self::dir(id))]
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
