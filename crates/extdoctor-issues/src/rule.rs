//! The issue rule abstraction
//!
//! A rule is a single-purpose predicate over one extension record. Rules
//! are stateless unit structs registered in [`crate::rules::RULES`]; the
//! [`crate::IssueManager`] evaluates them and keeps the ones that trigger.

use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_core::platform::Uninstaller;
use extdoctor_extensions::{AuditContext, ExtensionRecord, ForcedRemoval};
use serde::Serialize;
use std::fmt;

/// Namespace prefixed to rule names to form their fully qualified id
pub const RULE_NAMESPACE: &str = "extdoctor::issues";

/// Action used when the caller names none
pub const DEFAULT_ACTION: &str = "default";

/// Static description of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// Bare name, also the last segment of the qualified id
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub severity: Severity,
    /// Remediation guidance shown to the user
    pub template: &'static str,
    /// Fix actions the rule accepts
    pub actions: &'static [&'static str],
}

/// Services a fix may need beyond the audit context
pub struct FixContext<'a> {
    pub audit: &'a AuditContext,
    pub uninstaller: &'a dyn Uninstaller,
}

/// What a successful fix did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FixOutcome {
    Adopted { package_id: i64 },
    Removed(ForcedRemoval),
    UpdateSitesEnabled { count: usize },
    SchemaFixed { version: String },
}

impl fmt::Display for FixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adopted { package_id } => write!(f, "adopted by package {}", package_id),
            Self::Removed(report) => write!(
                f,
                "removed {} path(s) and {} table(s)",
                report.paths_removed.len(),
                report.tables_dropped.len()
            ),
            Self::UpdateSitesEnabled { count } => write!(f, "enabled {} update site(s)", count),
            Self::SchemaFixed { version } => write!(f, "schema set to {}", version),
        }
    }
}

pub trait IssueRule: Sync {
    fn info(&self) -> RuleInfo;

    /// Whether the issue applies to this extension
    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool;

    /// Severity for this extension, the rule default unless overridden
    fn severity(&self, _record: &ExtensionRecord) -> Severity {
        self.info().severity
    }

    /// Remediation guidance for this extension
    fn template(&self, _ctx: &AuditContext, _record: &ExtensionRecord) -> &'static str {
        self.info().template
    }

    /// Depends on state that fixes change, so it is re-checked on refresh
    fn volatile(&self) -> bool {
        false
    }

    /// Run a fix action; `action` is already normalized
    fn fix(&self, _fx: &FixContext<'_>, _record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        Err(Error::unknown_fix_action(self.info().name, action))
    }

    /// Fully qualified rule id
    fn id(&self) -> String {
        format!("{}::{}", RULE_NAMESPACE, self.info().name)
    }

    /// Whether `query`, a qualified id or bare name, names this rule
    fn matches(&self, query: &str) -> bool {
        bare_name(query).eq_ignore_ascii_case(self.info().name)
    }
}

/// Last segment of a rule id, split on `::` or `\`
pub fn bare_name(query: &str) -> &str {
    let query = query.trim();
    let after_colons = query.rsplit("::").next().unwrap_or(query);
    after_colons.rsplit('\\').next().unwrap_or(after_colons)
}

/// Lowercase action name, empty meaning the default
pub fn normalize_action(action: &str) -> String {
    let action = action.trim();
    if action.is_empty() {
        DEFAULT_ACTION.to_string()
    } else {
        action.to_ascii_lowercase()
    }
}
