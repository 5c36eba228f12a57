//! Per-extension issue evaluation and fix dispatch

use crate::rule::{normalize_action, FixContext, FixOutcome, IssueRule};
use crate::rules::RULES;
use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_extensions::{AuditContext, ExtensionRecord};
use serde::Serialize;
use tracing::{debug, info};

/// One triggered rule, as presented to the user
#[derive(Clone, Serialize)]
pub struct Issue {
    #[serde(skip)]
    rule: &'static dyn IssueRule,
    /// Fully qualified rule id
    pub id: String,
    pub slug: String,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub severity: Severity,
    pub template: &'static str,
    pub actions: &'static [&'static str],
}

impl Issue {
    fn new(rule: &'static dyn IssueRule, ctx: &AuditContext, record: &ExtensionRecord) -> Self {
        let info = rule.info();
        Self {
            rule,
            id: rule.id(),
            slug: info.name.to_ascii_lowercase(),
            label: info.label,
            description: info.description,
            icon: info.icon,
            severity: rule.severity(record),
            template: rule.template(ctx, record),
            actions: info.actions,
        }
    }

    /// The rule's bare name
    pub fn name(&self) -> &'static str {
        self.rule.info().name
    }

    pub fn matches(&self, query: &str) -> bool {
        self.rule.matches(query)
    }
}

impl std::fmt::Debug for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issue")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("template", &self.template)
            .finish()
    }
}

/// The issues one extension has
///
/// Built by running every rule once; only triggered rules are kept.
#[derive(Debug, Clone)]
pub struct IssueManager {
    extension_id: i64,
    issues: Vec<Issue>,
}

impl IssueManager {
    pub fn evaluate(ctx: &AuditContext, record: &ExtensionRecord) -> Self {
        let issues: Vec<Issue> = RULES
            .iter()
            .copied()
            .filter(|rule| rule.detect(ctx, record))
            .map(|rule| Issue::new(rule, ctx, record))
            .collect();

        debug!("Extension {} has {} issue(s)", record.id(), issues.len());

        Self {
            extension_id: record.id(),
            issues,
        }
    }

    /// Re-run the volatile rules, keeping the declared order
    pub fn refresh(&mut self, ctx: &AuditContext, record: &ExtensionRecord) {
        let stable: Vec<Issue> = self
            .issues
            .drain(..)
            .filter(|issue| !issue.rule.volatile())
            .collect();

        self.issues = RULES
            .iter()
            .copied()
            .filter_map(|rule| {
                if rule.volatile() {
                    rule.detect(ctx, record).then(|| Issue::new(rule, ctx, record))
                } else {
                    stable.iter().find(|issue| issue.name() == rule.info().name).cloned()
                }
            })
            .collect();
    }

    pub fn extension_id(&self) -> i64 {
        self.extension_id
    }

    /// Issues in rule order
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_issue(&self, query: &str) -> bool {
        self.get_issue(query).is_some()
    }

    /// Issue by qualified id or case-insensitive bare name
    pub fn get_issue(&self, query: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.matches(query))
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|issue| issue.severity).max()
    }

    /// Run a fix action of one of this extension's issues
    ///
    /// An empty action means `default`. Fails when the extension does not
    /// have the issue or the issue has no such action.
    pub fn fix(
        &self,
        fx: &FixContext<'_>,
        record: &ExtensionRecord,
        issue: &str,
        action: &str,
    ) -> Result<FixOutcome> {
        let Some(found) = self.get_issue(issue) else {
            return Err(Error::unknown_issue(self.extension_id, issue));
        };

        let action = normalize_action(action);
        if !found.actions.contains(&action.as_str()) {
            return Err(Error::unknown_fix_action(found.name(), action));
        }

        info!(
            "Fixing {} on extension {} with action {}",
            found.name(),
            self.extension_id,
            action
        );
        found.rule.fix(fx, record, &action)
    }
}
