//! The known issue rules, in evaluation order

mod database;
mod flags;
mod installation;
mod packages;
mod update_sites;

pub use database::{MissingTables, SchemaOutOfDate};
pub use flags::{CoreForceDisabled, NonCoreLocked, NonCoreProtected};
pub use installation::{
    Broken, Discovered, Leftover, MissingLanguage, MissingMedia, NoScript, NoXmlManifest,
    PartiallyInstalled,
};
pub use packages::{InvalidChildren, MissingChildren, Orphaned, WrongParent};
pub use update_sites::{DisabledUpdateSite, WrongUpdateSite};

use crate::rule::{FixContext, FixOutcome, IssueRule};
use extdoctor_core::error::Result;
use extdoctor_extensions::remediation;
use extdoctor_extensions::{ExtensionRecord, Remover};

/// Every rule, in the order issues are reported
pub static RULES: &[&dyn IssueRule] = &[
    &Broken,
    &Discovered,
    &PartiallyInstalled,
    &Leftover,
    &MissingChildren,
    &InvalidChildren,
    &WrongParent,
    &Orphaned,
    &NonCoreProtected,
    &NonCoreLocked,
    &CoreForceDisabled,
    &NoScript,
    &NoXmlManifest,
    &MissingLanguage,
    &MissingMedia,
    &MissingTables,
    &SchemaOutOfDate,
    &DisabledUpdateSite,
    &WrongUpdateSite,
];

/// The rule `query` names, by qualified id or bare name
pub fn find(query: &str) -> Option<&'static dyn IssueRule> {
    RULES.iter().copied().find(|rule| rule.matches(query))
}

fn adopt(fx: &FixContext<'_>, record: &ExtensionRecord) -> Result<FixOutcome> {
    let package_id = remediation::adopt(fx.audit, record)?;
    Ok(FixOutcome::Adopted { package_id })
}

fn force_uninstall(fx: &FixContext<'_>, record: &ExtensionRecord) -> Result<FixOutcome> {
    let report = Remover::new(fx.audit, fx.uninstaller).force_remove(record)?;
    Ok(FixOutcome::Removed(report))
}
