//! # extdoctor-extensions
//!
//! The extension record model for extdoctor:
//! - One record per extension-table row, with the footprint its type's
//!   conventions and manifest declare
//! - Package sub-extension resolution and the adoption index
//! - Update-site and schema baseline lookups
//! - Remediation helpers and the uninstall workflows

pub mod context;
mod footprint;
pub mod kinds;
pub mod manifest;
pub mod package_index;
pub mod record;
pub mod remediation;
pub mod remover;
pub mod schema;

pub use context::AuditContext;
pub use footprint::Footprint;
pub use kinds::SubExtensionCriteria;
pub use manifest::Manifest;
pub use package_index::PackageAdoptionIndex;
pub use record::{ExtensionRecord, Presence, SubExtension};
pub use remover::{ForcedRemoval, Remover};
pub use schema::SchemaError;
