//! Error types for extdoctor-core

use thiserror::Error;

/// Result type alias using extdoctor-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for extdoctor
///
/// Only conditions the caller must see end up here. Missing manifests,
/// unreadable SQL files and similar environmental gaps are absorbed where
/// they happen and never become an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// Extension type tag with no matching record variant
    #[error("Unsupported extension type: {kind}")]
    UnsupportedType { kind: String },

    /// Column name that does not exist on the extensions table
    #[error("Invalid field: {field} is not a column of the extensions table")]
    InvalidField { field: String },

    /// No extension row with this id
    #[error("Extension not found: {id}")]
    ExtensionNotFound { id: i64 },

    /// Issue slug that did not trigger for the extension
    #[error("Extension {id} has no issue matching '{issue}'")]
    UnknownIssue { id: i64, issue: String },

    /// Fix action with no handler on the issue
    #[error("Issue '{issue}' has no fix action '{action}'")]
    UnknownFixAction { issue: String, action: String },

    /// Operation the platform adapter does not implement
    #[error("Not yet supported: {operation}")]
    NotSupported { operation: String },

    /// Platform uninstall routine failed
    #[error("Uninstalling extension {id} failed: {message}")]
    Uninstall { id: i64, message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(kind: impl Into<String>) -> Self {
        Self::UnsupportedType { kind: kind.into() }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
        }
    }

    /// Create an extension not found error
    pub fn extension_not_found(id: i64) -> Self {
        Self::ExtensionNotFound { id }
    }

    /// Create an unknown issue error
    pub fn unknown_issue(id: i64, issue: impl Into<String>) -> Self {
        Self::UnknownIssue {
            id,
            issue: issue.into(),
        }
    }

    /// Create an unknown fix action error
    pub fn unknown_fix_action(issue: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownFixAction {
            issue: issue.into(),
            action: action.into(),
        }
    }

    /// Create a not supported error
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    /// Create an uninstall failure error
    pub fn uninstall(id: i64, message: impl Into<String>) -> Self {
        Self::Uninstall {
            id,
            message: message.into(),
        }
    }
}
