//! Database tables and schema baselines

use crate::rule::{FixContext, FixOutcome, IssueRule, RuleInfo};
use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_extensions::remediation;
use extdoctor_extensions::{AuditContext, ExtensionRecord};

/// Declared tables missing from an extension without a schema baseline
///
/// Extensions with a baseline are covered by [`SchemaOutOfDate`] instead.
pub struct MissingTables;

impl IssueRule for MissingTables {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "MissingTables",
            label: "Missing database tables",
            description: "Database tables the extension creates on installation do not exist.",
            icon: "fa-table",
            severity: Severity::Critical,
            template: "reinstall",
            actions: &[],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        if record.has_schemas_entry(ctx) || record.tables().is_empty() {
            return false;
        }

        let live = ctx.live_tables();
        record.tables().iter().any(|table| !live.contains(table))
    }
}

pub struct SchemaOutOfDate;

impl IssueRule for SchemaOutOfDate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "SchemaOutOfDate",
            label: "Database schema out of date",
            description: "The extension's database schema does not match its newest update.",
            icon: "fa-database",
            severity: Severity::Warning,
            template: "schema",
            actions: &["default"],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        record.has_schemas_entry(ctx) && !record.schema_errors(ctx).is_empty()
    }

    fn volatile(&self) -> bool {
        true
    }

    fn fix(&self, fx: &FixContext<'_>, record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        match action {
            "default" => {
                let version = remediation::fix_schema(fx.audit, record)?;
                Ok(FixOutcome::SchemaFixed { version })
            }
            _ => Err(Error::unknown_fix_action(self.info().name, action)),
        }
    }
}
