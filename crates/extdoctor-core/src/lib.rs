//! # extdoctor-core
//!
//! Core library for extdoctor providing:
//! - Configuration loading (config.yaml with hierarchical precedence)
//! - Raw extension-table row types
//! - Path normalization and symlink-aware existence checks
//! - SQL script helpers and the installed-locale catalog
//! - Platform service traits and their SQLite / console adapters

pub mod config;
pub mod error;
pub mod languages;
pub mod paths;
pub mod platform;
pub mod sql;
pub mod types;

pub use config::{DoctorConfig, HierarchicalConfigLoader};
pub use error::{Error, Result};
pub use languages::LanguageCatalog;
pub use paths::PathNormalizer;
