//! Extension row builders

#![allow(dead_code)]

use extdoctor_core::types::ExtensionRow;

/// Fluent builder for extension-table rows
pub struct RowBuilder {
    row: ExtensionRow,
}

impl RowBuilder {
    fn new(kind: &str, element: &str) -> Self {
        Self {
            row: ExtensionRow {
                name: element.to_string(),
                kind: kind.to_string(),
                element: element.to_string(),
                enabled: 1,
                access: 1,
                manifest_cache: "{}".to_string(),
                params: "{}".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn component(element: &str) -> Self {
        Self::new("component", element).client(1)
    }

    pub fn plugin(group: &str, element: &str) -> Self {
        Self::new("plugin", element).folder(group)
    }

    pub fn module(element: &str, client: i64) -> Self {
        Self::new("module", element).client(client)
    }

    pub fn template(element: &str, client: i64) -> Self {
        Self::new("template", element).client(client)
    }

    pub fn library(element: &str) -> Self {
        Self::new("library", element)
    }

    pub fn file(element: &str) -> Self {
        Self::new("file", element)
    }

    pub fn package(element: &str) -> Self {
        Self::new("package", element)
    }

    pub fn raw(kind: &str, element: &str) -> Self {
        Self::new(kind, element)
    }

    pub fn folder(mut self, folder: &str) -> Self {
        self.row.folder = folder.to_string();
        self
    }

    pub fn client(mut self, client: i64) -> Self {
        self.row.client_id = Some(client);
        self
    }

    pub fn package_id(mut self, package_id: i64) -> Self {
        self.row.package_id = package_id;
        self
    }

    pub fn state(mut self, state: i64) -> Self {
        self.row.state = state;
        self
    }

    pub fn discovered(self) -> Self {
        self.state(-1)
    }

    pub fn build(self) -> ExtensionRow {
        self.row
    }
}
