//! Package membership and ownership

use super::{adopt, force_uninstall};
use crate::rule::{FixContext, FixOutcome, IssueRule, RuleInfo};
use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_extensions::{AuditContext, ExtensionRecord};

pub struct MissingChildren;

impl IssueRule for MissingChildren {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "MissingChildren",
            label: "Missing package contents",
            description: "The package declares extensions that are not installed.",
            icon: "fa-box-open",
            severity: Severity::Error,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_package() && record.has_manifest() && record.has_missing_subextensions(ctx)
    }
}

pub struct InvalidChildren;

impl IssueRule for InvalidChildren {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "InvalidChildren",
            label: "Unexpected package members",
            description: "Extensions claim to belong to this package, but its manifest does not list them.",
            icon: "fa-people-arrows",
            severity: Severity::Warning,
            template: "reinstall_or_remove",
            actions: &[],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_package() && record.has_manifest() && record.has_invalid_children(ctx)
    }
}

pub struct WrongParent;

impl IssueRule for WrongParent {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "WrongParent",
            label: "Wrong parent package",
            description: "The package names a different parent package than the package that declares it.",
            icon: "fa-sitemap",
            severity: Severity::Error,
            template: "adopt",
            actions: &["default", "adopt"],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_package() && ctx.adoption_index().has_wrong_package_id(record.id())
    }

    fn fix(&self, fx: &FixContext<'_>, record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        match action {
            "default" | "adopt" => adopt(fx, record),
            _ => Err(Error::unknown_fix_action(self.info().name, action)),
        }
    }
}

pub struct Orphaned;

impl IssueRule for Orphaned {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "Orphaned",
            label: "Orphaned extension",
            description: "The extension has no update site and no valid parent package.",
            icon: "fa-child",
            severity: Severity::Warning,
            template: "rebuild_update_sites",
            actions: &["adopt", "uninstall"],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_orphan(ctx)
    }

    fn template(&self, ctx: &AuditContext, record: &ExtensionRecord) -> &'static str {
        if ctx.adoption_index().which_package(record.id()).is_some() {
            "adopt"
        } else if !record.is_installed() {
            "uninstall"
        } else {
            self.info().template
        }
    }

    fn fix(&self, fx: &FixContext<'_>, record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        match action {
            "adopt" => adopt(fx, record),
            "uninstall" => force_uninstall(fx, record),
            _ => Err(Error::unknown_fix_action(self.info().name, action)),
        }
    }
}
