//! Protection, lock and enable flags

use crate::rule::{IssueRule, RuleInfo};
use crate::severity::Severity;
use extdoctor_extensions::{AuditContext, ExtensionRecord};

pub struct NonCoreProtected;

impl IssueRule for NonCoreProtected {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "NonCoreProtected",
            label: "Protected third-party extension",
            description: "A third-party extension carries the protected flag, so it cannot be disabled or uninstalled.",
            icon: "fa-shield-halved",
            severity: Severity::Notice,
            template: "unprotect",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        !record.is_core() && record.is_protected()
    }
}

pub struct NonCoreLocked;

impl IssueRule for NonCoreLocked {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "NonCoreLocked",
            label: "Locked third-party extension",
            description: "A third-party extension carries the locked flag, so it cannot be uninstalled.",
            icon: "fa-lock",
            severity: Severity::Notice,
            template: "unlock",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        !record.is_core() && record.is_locked()
    }
}

pub struct CoreForceDisabled;

impl IssueRule for CoreForceDisabled {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "CoreForceDisabled",
            label: "Protected core extension disabled",
            description: "A protected core extension is disabled and cannot be re-enabled from the administrator.",
            icon: "fa-power-off",
            severity: Severity::Critical,
            template: "none",
            actions: &[],
        }
    }

    fn detect(&self, _ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.is_core() && record.is_protected() && !record.is_enabled()
    }
}
