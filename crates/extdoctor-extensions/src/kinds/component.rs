use super::{ini_pair, Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::types::Client;

pub(crate) struct Component;

const ADMIN_LANGUAGES: &[&str] = &["administration", "languages"];
const API_LANGUAGES: &[&str] = &["api", "languages"];

impl Component {
    fn area_dir(client: Client, element: &str) -> String {
        client.path(&format!("components/{}", element))
    }

    fn areas(site: &Site<'_>) -> Vec<Client> {
        let mut areas = vec![Client::Site, Client::Administrator];
        if site.api_enabled {
            areas.push(Client::Api);
        }
        areas
    }
}

impl Conventions for Component {
    fn default_paths(&self, site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        for area in Self::areas(site) {
            fp.add_directory(&Self::area_dir(area, id.element));
        }
    }

    fn language_scopes(&self, site: &Site<'_>, id: &Identity<'_>) -> Vec<LanguageScope> {
        Self::areas(site)
            .into_iter()
            .map(|area| LanguageScope {
                client: area,
                local_dir: Some(Self::area_dir(area, id.element)),
                manifest_block: match area {
                    Client::Administrator => ADMIN_LANGUAGES,
                    Client::Api => API_LANGUAGES,
                    _ => ROOT_LANGUAGES,
                },
                default_names: ini_pair(id.element),
            })
            .collect()
    }

    fn default_media(&self, _site: &Site<'_>, id: &Identity<'_>, fp: &mut Footprint) {
        fp.add_media(&format!("media/{}", id.element));
    }

    fn sql_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::area_dir(Client::Administrator, id.element))
    }

    fn manifest_candidates(&self, id: &Identity<'_>) -> Vec<String> {
        let dir = Self::area_dir(Client::Administrator, id.element);
        let bare = id.element.strip_prefix("com_").unwrap_or(id.element);
        vec![
            format!("{}/{}.xml", dir, bare),
            format!("{}/{}.xml", dir, id.element),
        ]
    }

    fn manifest_paths(&self, site: &Site<'_>, id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();

        if let Some(files) = manifest.child("files") {
            fp.add_file_block(&Self::area_dir(Client::Site, id.element), files);
        }
        if let Some(files) = manifest.child("administration").and_then(|a| a.child("files")) {
            fp.add_file_block(&Self::area_dir(Client::Administrator, id.element), files);
        }
        if site.api_enabled {
            if let Some(files) = manifest.child("api").and_then(|a| a.child("files")) {
                fp.add_file_block(&Self::area_dir(Client::Api, id.element), files);
            }
        }
    }

    fn manifest_media(&self, _id: &Identity<'_>, manifest: &Manifest, fp: &mut Footprint) {
        fp.media_paths.clear();
        let blocks = manifest.root().children_named("media").chain(
            manifest
                .child("administration")
                .into_iter()
                .flat_map(|admin| admin.children_named("media")),
        );
        for media in blocks {
            fp.add_media_block(media);
        }
    }

    fn script_base(&self, id: &Identity<'_>) -> Option<String> {
        Some(Self::area_dir(Client::Administrator, id.element))
    }
}
