//! Common test utilities for extdoctor-extensions
//!
//! This module provides shared test infrastructure including:
//! - A throwaway site root with a seeded SQLite database
//! - Extension row builders
//! - A recording uninstaller

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mocks::*;
