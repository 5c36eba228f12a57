//! Update sites against the manifest's update servers

use crate::rule::{FixContext, FixOutcome, IssueRule, RuleInfo};
use crate::severity::Severity;
use extdoctor_core::error::{Error, Result};
use extdoctor_extensions::remediation;
use extdoctor_extensions::{AuditContext, ExtensionRecord};

pub struct DisabledUpdateSite;

impl IssueRule for DisabledUpdateSite {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "DisabledUpdateSite",
            label: "Update site disabled",
            description: "The extension's own update site is registered but disabled, so updates are never found.",
            icon: "fa-satellite-dish",
            severity: Severity::Error,
            template: "enable_update_site",
            actions: &["default", "enable"],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        let servers = record.canonical_update_servers();
        if servers.is_empty() {
            return false;
        }

        let mut canonical = record
            .update_sites(ctx)
            .iter()
            .filter(|site| servers.iter().any(|url| site.points_at(url)))
            .peekable();

        canonical.peek().is_some() && canonical.all(|site| !site.enabled)
    }

    fn volatile(&self) -> bool {
        true
    }

    fn fix(&self, fx: &FixContext<'_>, record: &ExtensionRecord, action: &str) -> Result<FixOutcome> {
        match action {
            "default" | "enable" => {
                let count = remediation::enable_canonical_update_sites(fx.audit, record)?;
                Ok(FixOutcome::UpdateSitesEnabled { count })
            }
            _ => Err(Error::unknown_fix_action(self.info().name, action)),
        }
    }
}

pub struct WrongUpdateSite;

impl IssueRule for WrongUpdateSite {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            name: "WrongUpdateSite",
            label: "Unexpected update site",
            description: "An enabled update site points somewhere the extension's manifest does not declare.",
            icon: "fa-route",
            severity: Severity::Error,
            template: "rebuild_update_sites",
            actions: &[],
        }
    }

    fn detect(&self, ctx: &AuditContext, record: &ExtensionRecord) -> bool {
        let servers = record.canonical_update_servers();
        if record.is_core() || servers.is_empty() {
            return false;
        }

        record
            .update_sites(ctx)
            .iter()
            .filter(|site| site.enabled)
            .any(|site| !servers.iter().any(|url| site.points_at(url)))
    }
}
