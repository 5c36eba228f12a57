//! Built-in extension list

use super::CoreOracle;
use crate::error::{Error, Result};
use crate::types::{Client, ExtensionType};
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/core/"]
#[prefix = ""]
struct EmbeddedCoreLists;

const CORE_LIST_FILE: &str = "core-extensions.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoreListFile {
    components: Vec<String>,
    modules: ClientLists,
    plugins: BTreeMap<String, Vec<String>>,
    templates: ClientLists,
    libraries: Vec<String>,
    languages: Vec<String>,
    files: Vec<String>,
    packages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientLists {
    site: Vec<String>,
    administrator: Vec<String>,
}

/// The platform's own extensions, keyed by identity
///
/// Keys are `type:element`, with the plugin group or client inserted for
/// the types that need it: `plugin:system:cache`, `module:site:mod_menu`.
#[derive(Debug, Clone, Default)]
pub struct CoreExtensions {
    keys: HashSet<String>,
}

impl CoreExtensions {
    /// Load the embedded list plus configured extra keys
    pub fn load(extra: &[String]) -> Result<Self> {
        let embedded = EmbeddedCoreLists::get(CORE_LIST_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded core list not found: {}", CORE_LIST_FILE))
        })?;
        let content = std::str::from_utf8(&embedded.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in {}", CORE_LIST_FILE))
        })?;
        let list: CoreListFile = serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!("Failed to parse {}: {}", CORE_LIST_FILE, e))
        })?;

        let mut core = Self::from_list(list);
        for key in extra {
            core.insert_key(key)?;
        }

        debug!("Core extension list holds {} entries", core.keys.len());
        Ok(core)
    }

    /// An empty list, to which keys are added by hand
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_list(list: CoreListFile) -> Self {
        let mut core = Self::default();

        for element in &list.components {
            core.add(ExtensionType::Component, element, Client::Unknown, None);
        }
        for (client, elements) in [
            (Client::Site, &list.modules.site),
            (Client::Administrator, &list.modules.administrator),
        ] {
            for element in elements {
                core.add(ExtensionType::Module, element, client, None);
            }
        }
        for (group, elements) in &list.plugins {
            for element in elements {
                core.add(ExtensionType::Plugin, element, Client::Unknown, Some(group.as_str()));
            }
        }
        for (client, elements) in [
            (Client::Site, &list.templates.site),
            (Client::Administrator, &list.templates.administrator),
        ] {
            for element in elements {
                core.add(ExtensionType::Template, element, client, None);
            }
        }
        for tag in &list.languages {
            for client in [Client::Site, Client::Administrator, Client::Api] {
                core.add(ExtensionType::Language, tag, client, None);
            }
        }
        for (kind, elements) in [
            (ExtensionType::Library, &list.libraries),
            (ExtensionType::File, &list.files),
            (ExtensionType::Package, &list.packages),
        ] {
            for element in elements {
                core.add(kind, element, Client::Unknown, None);
            }
        }

        core
    }

    /// Register one extension as core
    pub fn add(&mut self, kind: ExtensionType, element: &str, client: Client, folder: Option<&str>) {
        self.keys.insert(Self::key(kind, element, client, folder));
    }

    /// Register a textual key such as `plugin:system:foo`
    pub fn insert_key(&mut self, key: &str) -> Result<()> {
        let parts: Vec<&str> = key.split(':').map(str::trim).collect();
        let invalid = || Error::invalid_config(format!("Invalid core extension key '{}'", key));

        let kind = ExtensionType::parse(parts.first().copied().unwrap_or_default())
            .map_err(|_| invalid())?;

        match (kind, parts.as_slice()) {
            (ExtensionType::Plugin, [_, group, element]) => {
                self.add(kind, element, Client::Unknown, Some(*group))
            }
            (
                ExtensionType::Module | ExtensionType::Template | ExtensionType::Language,
                [_, client, element],
            ) => {
                let client = match *client {
                    "site" => Client::Site,
                    "administrator" => Client::Administrator,
                    "api" => Client::Api,
                    _ => return Err(invalid()),
                };
                self.add(kind, element, client, None)
            }
            (
                ExtensionType::Component
                | ExtensionType::Library
                | ExtensionType::File
                | ExtensionType::Package,
                [_, element],
            ) => self.add(kind, element, Client::Unknown, None),
            _ => return Err(invalid()),
        }

        Ok(())
    }

    fn key(kind: ExtensionType, element: &str, client: Client, folder: Option<&str>) -> String {
        let element = element.trim().to_lowercase();
        match kind {
            ExtensionType::Plugin => {
                format!("plugin:{}:{}", folder.unwrap_or_default().to_lowercase(), element)
            }
            ExtensionType::Module | ExtensionType::Template | ExtensionType::Language => {
                format!("{}:{}:{}", kind, client, element)
            }
            _ => format!("{}:{}", kind, element),
        }
    }
}

impl CoreOracle for CoreExtensions {
    fn is_core(
        &self,
        kind: ExtensionType,
        element: &str,
        client: Client,
        folder: Option<&str>,
    ) -> bool {
        self.keys.contains(&Self::key(kind, element, client, folder))
    }
}
