//! Services the audit consumes from the host platform
//!
//! The extension model never talks to the database, the built-in extension
//! list or the platform installer directly. It goes through the traits
//! below, which keeps tests free to swap in seeded fixtures.

mod console;
mod core_list;
mod sqlite;

pub use console::ConsoleUninstaller;
pub use core_list::CoreExtensions;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::{Client, ColumnValue, ExtensionColumn, ExtensionRow, ExtensionType, UpdateSite};
use std::collections::HashMap;

/// Exact-match lookup of one extension
///
/// `folder` and `client` only constrain the match when set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionQuery {
    pub kind: ExtensionType,
    pub element: String,
    pub folder: Option<String>,
    pub client: Option<i64>,
}

impl ExtensionQuery {
    pub fn new(kind: ExtensionType, element: impl Into<String>) -> Self {
        Self {
            kind,
            element: element.into(),
            folder: None,
            client: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_client(mut self, client: i64) -> Self {
        self.client = Some(client);
        self
    }
}

/// Sort order for extension listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionOrder {
    pub column: ExtensionColumn,
    pub descending: bool,
}

impl Default for ExtensionOrder {
    fn default() -> Self {
        Self {
            column: ExtensionColumn::ExtensionId,
            descending: false,
        }
    }
}

/// Filtered listing of the extensions table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    pub kind: Option<ExtensionType>,
    pub package_id: Option<i64>,
    pub state: Option<i64>,
    /// Substring matched against name and element
    pub search: Option<String>,
    pub order: ExtensionOrder,
}

/// Row store holding the platform's extension tables
pub trait ExtensionStore {
    /// Table prefix replacing `#__`
    fn prefix(&self) -> &str;

    fn extension_by_id(&self, id: i64) -> Result<Option<ExtensionRow>>;

    fn find_extension(&self, query: &ExtensionQuery) -> Result<Option<ExtensionRow>>;

    fn list_extensions(&self, filter: &ExtensionFilter) -> Result<Vec<ExtensionRow>>;

    /// Ids of every package-type extension
    fn package_ids(&self) -> Result<Vec<i64>>;

    /// Write one column of one extension row
    fn set_column(&self, id: i64, column: ExtensionColumn, value: &ColumnValue) -> Result<()>;

    /// Every update site linked to an extension, as `(extension_id, site)`
    fn update_sites(&self) -> Result<Vec<(i64, UpdateSite)>>;

    fn set_update_site_enabled(&self, update_site_id: i64, enabled: bool) -> Result<()>;

    /// Stored schema version per extension id
    fn schema_versions(&self) -> Result<HashMap<i64, String>>;

    fn set_schema_version(&self, extension_id: i64, version: &str) -> Result<()>;

    /// Live tables carrying the prefix, returned without it
    fn live_tables(&self) -> Result<Vec<String>>;

    /// Drop a table given without its prefix; missing tables are ignored
    fn drop_table(&self, table: &str) -> Result<()>;

    /// Forget fetched update information so it is re-read on next check
    fn purge_update_cache(&self) -> Result<()>;

    /// Bump the version string appended to asset URLs
    fn refresh_media_version(&self) -> Result<()>;
}

/// Answers whether an extension ships with the platform itself
pub trait CoreOracle {
    fn is_core(
        &self,
        kind: ExtensionType,
        element: &str,
        client: Client,
        folder: Option<&str>,
    ) -> bool;
}

/// The platform's own uninstall routine
pub trait Uninstaller {
    /// Uninstall one extension, running its uninstall scripts
    fn uninstall(&self, id: i64) -> Result<()>;

    /// Drop cached installer adapter state
    ///
    /// Must run between uninstalls; a stale adapter makes the next
    /// uninstall use the previous extension type's handler.
    fn reset_adapter_cache(&self);
}
