//! Mock platform services

#![allow(dead_code)]

use camino::Utf8PathBuf;
use extdoctor_core::error::{Error, Result};
use extdoctor_core::platform::Uninstaller;
use std::cell::RefCell;

/// One interaction with the uninstaller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallCall {
    Uninstall(i64),
    ResetCache,
}

/// Uninstaller that records its calls instead of running the platform
#[derive(Default)]
pub struct RecordingUninstaller {
    calls: RefCell<Vec<UninstallCall>>,
    fail_on: Option<i64>,
    watched: Option<Utf8PathBuf>,
    watched_present: RefCell<Vec<bool>>,
}

impl RecordingUninstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the uninstall of one extension
    pub fn failing_on(mut self, id: i64) -> Self {
        self.fail_on = Some(id);
        self
    }

    /// Note whether `path` exists each time an uninstall runs
    pub fn watching(mut self, path: Utf8PathBuf) -> Self {
        self.watched = Some(path);
        self
    }

    pub fn calls(&self) -> Vec<UninstallCall> {
        self.calls.borrow().clone()
    }

    pub fn uninstalled(&self) -> Vec<i64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                UninstallCall::Uninstall(id) => Some(*id),
                UninstallCall::ResetCache => None,
            })
            .collect()
    }

    pub fn watched_present(&self) -> Vec<bool> {
        self.watched_present.borrow().clone()
    }
}

impl Uninstaller for RecordingUninstaller {
    fn uninstall(&self, id: i64) -> Result<()> {
        self.calls.borrow_mut().push(UninstallCall::Uninstall(id));
        if let Some(path) = &self.watched {
            self.watched_present.borrow_mut().push(path.exists());
        }

        if self.fail_on == Some(id) {
            return Err(Error::uninstall(id, "Uninstall script aborted"));
        }
        Ok(())
    }

    fn reset_adapter_cache(&self) {
        self.calls.borrow_mut().push(UninstallCall::ResetCache);
    }
}
