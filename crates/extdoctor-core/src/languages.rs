//! Installed locale discovery
//!
//! Each application area keeps its translations under its own `language/`
//! directory, one subdirectory per locale tag. A locale counts as installed
//! in an area when its directory carries a metadata or manifest file.

use crate::paths::PathNormalizer;
use crate::types::Client;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static LOCALE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z0-9]{2,8})+$").expect("locale tag regex is valid")
});

/// Installed locale tags per application area
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    site: Vec<String>,
    administrator: Vec<String>,
    api: Vec<String>,
}

impl LanguageCatalog {
    /// Scan the site for installed locales
    pub fn scan(paths: &PathNormalizer, api_enabled: bool) -> Self {
        let catalog = Self {
            site: Self::scan_area(paths, Client::Site),
            administrator: Self::scan_area(paths, Client::Administrator),
            api: if api_enabled {
                Self::scan_area(paths, Client::Api)
            } else {
                Vec::new()
            },
        };

        debug!(
            "Locale catalog: site={:?} administrator={:?} api={:?}",
            catalog.site, catalog.administrator, catalog.api
        );

        catalog
    }

    /// Build a catalog from known tags
    pub fn from_tags(site: &[&str], administrator: &[&str], api: &[&str]) -> Self {
        let own = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect();
        Self {
            site: own(site),
            administrator: own(administrator),
            api: own(api),
        }
    }

    fn scan_area(paths: &PathNormalizer, client: Client) -> Vec<String> {
        let language_dir = client.path("language");

        paths
            .list_dir(&language_dir)
            .into_iter()
            .filter(|tag| LOCALE_TAG_RE.is_match(tag))
            .filter(|tag| {
                let dir = format!("{}/{}", language_dir, tag);
                let legacy = format!("{}.xml", tag);
                ["langmetadata.xml", "install.xml", legacy.as_str()]
                    .iter()
                    .any(|file| paths.is_file(&format!("{}/{}", dir, file)))
            })
            .collect()
    }

    /// Locale tags installed in one application area
    pub fn tags(&self, client: Client) -> &[String] {
        match client {
            Client::Site => &self.site,
            Client::Administrator => &self.administrator,
            Client::Api => &self.api,
            Client::Unknown => &[],
        }
    }

    /// Every locale tag installed anywhere, sorted and deduplicated
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .site
            .iter()
            .chain(&self.administrator)
            .chain(&self.api)
            .cloned()
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn is_installed(&self, client: Client, tag: &str) -> bool {
        self.tags(client).iter().any(|t| t == tag)
    }
}
