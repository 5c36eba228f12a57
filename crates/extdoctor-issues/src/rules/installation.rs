//! Whether the extension's files are where they should be

use super::force_uninstall;
use crate::rule::{FixContext, FixOutcome, IssueRule, RuleInfo};
use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_extensions::{AuditContext, ExtensionRecord};

/// Core extensions are checked by the platform's own tooling
fn unless_core(record: &ExtensionRecord, severity: Severity) -> Severity {
    if record.is_core() {
        Severity::Debug
    } else {
        severity
    }
}

pub struct Broken;

impl IssueRule for Broken {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "Broken",
            label: "Broken installation",
            description: "The extension is registered but its files are not in place.",
            icon: "fa-heart-crack",
            severity: Severity::Critical,
            template: "none",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        !record.is_installed() && !record.is_discovered()
    }

    fn severity(&self, record: &ExtensionRecord) -> Severity {
        unless_core(record, self.info().severity)
    }
}

pub struct Discovered;

impl IssueRule for Discovered {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "Discovered",
            label: "Discovered, not installed",
            description: "The extension's files exist but it was never installed.",
            icon: "fa-magnifying-glass",
            severity: Severity::Debug,
            template: "discover",
            actions: &["uninstall"],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_discovered()
    }

    fn fix(&self, fx: &FixContext<'_>, record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        match action {
            "uninstall" => force_uninstall(fx, record),
            _ => Err(Error::unknown_fix_action(self.info().name, action)),
        }
    }
}

pub struct PartiallyInstalled;

impl IssueRule for PartiallyInstalled {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "PartiallyInstalled",
            label: "Partially installed",
            description: "Some of the extension's directories or files are missing.",
            icon: "fa-puzzle-piece",
            severity: Severity::Error,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_partially_installed()
    }

    fn severity(&self, record: &ExtensionRecord) -> Severity {
        unless_core(record, self.info().severity)
    }
}

pub struct Leftover;

impl IssueRule for Leftover {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "Leftover",
            label: "Leftover record",
            description: "None of the extension's directories or files exist any more.",
            icon: "fa-ghost",
            severity: Severity::Critical,
            template: "none",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_leftover()
    }
}

pub struct NoScript;

impl IssueRule for NoScript {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "NoScript",
            label: "Missing installation script",
            description: "The manifest names an installation script that does not exist.",
            icon: "fa-scroll",
            severity: Severity::Info,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record
            .script_path()
            .is_some_and(|script| !record.file_really_exists(script))
    }
}

pub struct NoXmlManifest;

impl IssueRule for NoXmlManifest {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "NoXMLManifest",
            label: "Missing XML manifest",
            description: "The extension's XML manifest file does not exist.",
            icon: "fa-file-circle-xmark",
            severity: Severity::Critical,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record
            .manifest_path()
            .is_some_and(|manifest| !record.file_really_exists(manifest))
    }
}

pub struct MissingLanguage;

impl IssueRule for MissingLanguage {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "MissingLanguage",
            label: "Missing language files",
            description: "Translation files the manifest declares for an installed language are missing.",
            icon: "fa-language",
            severity: Severity::Info,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_missing_languages(false)
    }

    fn severity(&self, record: &ExtensionRecord) -> Severity {
        unless_core(record, self.info().severity)
    }
}

pub struct MissingMedia;

impl IssueRule for MissingMedia {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "MissingMedia",
            label: "Missing media files",
            description: "A media folder or file the extension declares is missing.",
            icon: "fa-image",
            severity: Severity::Info,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record
            .media_paths()
            .iter()
            .any(|path| !record.file_really_exists(path))
    }
}
