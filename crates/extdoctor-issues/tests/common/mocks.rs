//! Mock platform services

#![allow(dead_code)]

use extdoctor_core::error::Result;
use extdoctor_core::platform::Uninstaller;
use std::cell::RefCell;

/// One interaction with the uninstaller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallCall {
    Uninstall(i64),
    ResetCache,
}

/// Uninstaller that only records its calls
///
/// Fixes must never reach it unless they uninstall.
#[derive(Default)]
pub struct RecordingUninstaller {
    calls: RefCell<Vec<UninstallCall>>,
}

impl RecordingUninstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<UninstallCall> {
        self.calls.borrow().clone()
    }
}

impl Uninstaller for RecordingUninstaller {
    fn uninstall(&self, id: i64) -> Result<()> {
        self.calls.borrow_mut().push(UninstallCall::Uninstall(id));
        Ok(())
    }

    fn reset_adapter_cache(&self) {
        self.calls.borrow_mut().push(UninstallCall::ResetCache);
    }
}
