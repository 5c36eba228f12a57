use super::{Conventions, Identity, ROOT_LANGUAGES};
use crate::footprint::{Footprint, LanguageScope, Site};
use crate::manifest::Manifest;
use extdoctor_core::platform::ExtensionQuery;
use extdoctor_core::types::{Client, ExtensionType};
use serde::Serialize;
use tracing::debug;

/// Packages own no files; their manifest lists other extensions
pub(crate) struct Package;

const MANIFEST_DIR: &str = "administrator/manifests/packages";

impl Conventions for Package {
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

    fn manifest_paths(&self, _site: &Site<'_>, _id: &Identity<'_>, _manifest: &Manifest, fp: &mut Footprint) {
        fp.directories.clear();
        fp.files.clear();
    }

    fn script_base(&self, id: &Identity<'_>) -> Option<String> {
        let bare = id.element.strip_prefix("pkg_").unwrap_or(id.element);
        Some(format!("{}/{}", MANIFEST_DIR, bare))
    }
}

/// One sub-extension a package manifest declares
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubExtensionCriteria {
    pub kind: ExtensionType,
    pub element: String,
    pub folder: Option<String>,
    pub client: Option<i64>,
}

impl SubExtensionCriteria {
    /// Exact-match lookup for this sub-extension
    pub fn query(&self) -> ExtensionQuery {
        ExtensionQuery {
            kind: self.kind,
            element: self.element.clone(),
            folder: self.folder.clone(),
            client: self.client,
        }
    }
}

/// Sub-extensions from `<files><file type=".." id="..">` entries
pub(crate) fn subextension_criteria(manifest: &Manifest) -> Vec<SubExtensionCriteria> {
    let Some(files) = manifest.child("files") else {
        return Vec::new();
    };

    let mut criteria = Vec::new();
    for file in files.children_named("file") {
        let (Some(raw_type), Some(element)) = (file.attr("type"), file.attr("id")) else {
            debug!("Package entry without type or id skipped");
            continue;
        };
        let Ok(kind) = ExtensionType::parse(raw_type) else {
            debug!("Package entry with unknown type '{}' skipped", raw_type);
            continue;
        };

        let folder = match kind {
            ExtensionType::Plugin => Some(file.attr("group").unwrap_or("system").to_string()),
            _ => file.attr("group").map(str::to_string),
        };

        let entry = SubExtensionCriteria {
            kind,
            element: element.to_string(),
            folder,
            client: file.attr("client").and_then(normalize_client),
        };
        if !criteria.contains(&entry) {
            criteria.push(entry);
        }
    }

    criteria
}

fn normalize_client(raw: &str) -> Option<i64> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "site" | "0" => Some(0),
        "administrator" | "1" => Some(1),
        _ => None,
    }
}
