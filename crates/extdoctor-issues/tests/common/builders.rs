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
        let mut builder = Self::new("component", element);
        builder.row.client_id = Some(1);
        builder
    }

    pub fn plugin(group: &str, element: &str) -> Self {
        let mut builder = Self::new("plugin", element);
        builder.row.folder = group.to_string();
        builder
    }

    pub fn module(element: &str, client: i64) -> Self {
        let mut builder = Self::new("module", element);
        builder.row.client_id = Some(client);
        builder
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

    pub fn disabled(mut self) -> Self {
        self.row.enabled = 0;
        self
    }

    pub fn protected(mut self) -> Self {
        self.row.protected = 1;
        self
    }

    pub fn locked(mut self) -> Self {
        self.row.locked = 1;
        self
    }

    pub fn build(self) -> ExtensionRow {
        self.row
    }
}
