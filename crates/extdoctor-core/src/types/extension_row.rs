//! Raw extension rows as stored in the platform's extensions table

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extension type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    Component,
    Plugin,
    Module,
    Template,
    Library,
    Language,
    File,
    Package,
}

impl ExtensionType {
    /// Every supported type, in display order
    pub const ALL: [ExtensionType; 8] = [
        Self::Component,
        Self::Plugin,
        Self::Module,
        Self::Template,
        Self::Library,
        Self::Language,
        Self::File,
        Self::Package,
    ];

    /// The tag used in the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Plugin => "plugin",
            Self::Module => "module",
            Self::Template => "template",
            Self::Library => "library",
            Self::Language => "language",
            Self::File => "file",
            Self::Package => "package",
        }
    }

    /// Parse a raw type tag
    ///
    /// The tag is reduced to ASCII alphanumerics and underscores and
    /// lowercased before matching, so `" Plugin\n"` parses as a plugin.
    pub fn parse(raw: &str) -> Result<Self> {
        let clean: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == clean)
            .ok_or_else(|| Error::unsupported_type(raw))
    }
}

impl FromStr for ExtensionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application area an extension belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Client {
    Site,
    Administrator,
    Api,
    Unknown,
}

impl Client {
    /// Map a `client_id` column value
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            Some(0) => Self::Site,
            Some(1) => Self::Administrator,
            Some(3) => Self::Api,
            _ => Self::Unknown,
        }
    }

    /// The `client_id` column value, if the client is known
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Site => Some(0),
            Self::Administrator => Some(1),
            Self::Api => Some(3),
            Self::Unknown => None,
        }
    }

    /// Root-relative base directory of the application area
    ///
    /// The public site lives at the root itself, hence the empty string.
    pub fn base_dir(&self) -> &'static str {
        match self {
            Self::Site | Self::Unknown => "",
            Self::Administrator => "administrator",
            Self::Api => "api",
        }
    }

    /// Prefix `path` with the area's base directory
    pub fn path(&self, path: &str) -> String {
        match self.base_dir() {
            "" => path.to_string(),
            base => format!("{}/{}", base, path),
        }
    }

    /// Name used in media and template directories
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Administrator => "administrator",
            Self::Api => "api",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installation state derived from the `state` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallState {
    Installed,
    Discovered,
    Broken,
}

impl InstallState {
    pub fn from_state(state: i64) -> Self {
        match state {
            0 => Self::Installed,
            -1 => Self::Discovered,
            _ => Self::Broken,
        }
    }
}

/// One row of the extensions table
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionRow {
    pub extension_id: i64,
    pub package_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub element: String,
    pub folder: String,
    pub client_id: Option<i64>,
    pub enabled: i64,
    pub access: i64,
    pub protected: i64,
    pub locked: i64,
    pub manifest_cache: String,
    pub params: String,
    pub custom_data: String,
    pub state: i64,
    pub note: Option<String>,
}

impl ExtensionRow {
    /// Plugin group, `None` when the column is empty
    pub fn folder(&self) -> Option<&str> {
        let folder = self.folder.trim();
        (!folder.is_empty()).then_some(folder)
    }

    pub fn client(&self) -> Client {
        Client::from_id(self.client_id)
    }

    pub fn install_state(&self) -> InstallState {
        InstallState::from_state(self.state)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }

    pub fn is_protected(&self) -> bool {
        self.protected != 0
    }

    pub fn is_locked(&self) -> bool {
        self.locked != 0
    }

    /// Parent package id, `None` when the column is zero
    pub fn parent_package_id(&self) -> Option<i64> {
        (self.package_id != 0).then_some(self.package_id)
    }

    /// Decoded manifest cache; corrupt JSON reads as absent
    pub fn manifest_cache(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.manifest_cache).ok()
    }

    /// Decoded parameters; corrupt JSON reads as absent
    pub fn params(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.params).ok()
    }

    /// Version recorded in the manifest cache
    pub fn version(&self) -> Option<String> {
        self.manifest_cache()
            .and_then(|cache| cache.get("version").cloned())
            .and_then(|v| v.as_str().map(str::to_string))
    }
}

/// Columns of the extensions table
///
/// Single-column writes go through this enum so an unknown column can
/// never reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionColumn {
    ExtensionId,
    PackageId,
    Name,
    Type,
    Element,
    Changelogurl,
    Folder,
    ClientId,
    Enabled,
    Access,
    Protected,
    Locked,
    ManifestCache,
    Params,
    CustomData,
    CheckedOut,
    CheckedOutTime,
    Ordering,
    State,
    Note,
}

impl ExtensionColumn {
    const ALL: [ExtensionColumn; 20] = [
        Self::ExtensionId,
        Self::PackageId,
        Self::Name,
        Self::Type,
        Self::Element,
        Self::Changelogurl,
        Self::Folder,
        Self::ClientId,
        Self::Enabled,
        Self::Access,
        Self::Protected,
        Self::Locked,
        Self::ManifestCache,
        Self::Params,
        Self::CustomData,
        Self::CheckedOut,
        Self::CheckedOutTime,
        Self::Ordering,
        Self::State,
        Self::Note,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtensionId => "extension_id",
            Self::PackageId => "package_id",
            Self::Name => "name",
            Self::Type => "type",
            Self::Element => "element",
            Self::Changelogurl => "changelogurl",
            Self::Folder => "folder",
            Self::ClientId => "client_id",
            Self::Enabled => "enabled",
            Self::Access => "access",
            Self::Protected => "protected",
            Self::Locked => "locked",
            Self::ManifestCache => "manifest_cache",
            Self::Params => "params",
            Self::CustomData => "custom_data",
            Self::CheckedOut => "checked_out",
            Self::CheckedOutTime => "checked_out_time",
            Self::Ordering => "ordering",
            Self::State => "state",
            Self::Note => "note",
        }
    }

    /// Whether the column holds an integer
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::ExtensionId
                | Self::PackageId
                | Self::ClientId
                | Self::Enabled
                | Self::Access
                | Self::Protected
                | Self::Locked
                | Self::CheckedOut
                | Self::Ordering
                | Self::State
        )
    }

    /// Parse a textual value into the column's storage type
    pub fn value_from_str(&self, raw: &str) -> Result<ColumnValue> {
        if raw.eq_ignore_ascii_case("null") {
            return Ok(ColumnValue::Null);
        }

        if self.is_integer() {
            raw.trim().parse::<i64>().map(ColumnValue::Int).map_err(|_| {
                Error::invalid_config(format!(
                    "Column {} expects an integer, got '{}'",
                    self.as_str(),
                    raw
                ))
            })
        } else {
            Ok(ColumnValue::Text(raw.to_string()))
        }
    }
}

impl FromStr for ExtensionColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| Error::invalid_field(s))
    }
}

impl fmt::Display for ExtensionColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value written to a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Int(i64),
    Text(String),
    Null,
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
