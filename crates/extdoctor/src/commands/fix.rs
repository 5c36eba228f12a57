//! Fix command

use anyhow::{Context, Result};
use extdoctor_core::platform::ConsoleUninstaller;
use extdoctor_issues::{Doctor, FixOutcome};

use super::open_context;
use crate::cli::{FixArgs, SiteArgs};
use crate::output;

/// Apply one fix action to one extension
///
/// Supports:
/// - Default action: `extdoctor fix 42 schemaoutofdate`
/// - Named action: `extdoctor fix 42 orphaned --action adopt`
pub fn run(args: FixArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;
    let uninstaller = ConsoleUninstaller::from_config(ctx.config());

    let outcome = Doctor::new(&ctx)
        .fix(&uninstaller, args.id, &args.issue, &args.action)
        .with_context(|| format!("Failed to fix {} on extension {}", args.issue, args.id))?;

    output::success(&format!("Extension {}: {}", args.id, outcome));

    if let FixOutcome::Removed(report) = &outcome {
        for path in &report.paths_skipped {
            output::warning(&format!("Left platform path in place: {}", path));
        }
        if !report.record_removed {
            output::warning("The extension row was kept; remove it from the administrator");
        }
    }

    Ok(())
}
