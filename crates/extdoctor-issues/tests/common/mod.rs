//! Common test utilities for extdoctor-issues
//!
//! Shared fixtures: a throwaway site with its database, row builders and a
//! recording uninstaller.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mocks::*;
