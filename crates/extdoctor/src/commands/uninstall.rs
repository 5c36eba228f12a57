//! Uninstall command

use anyhow::{bail, Context, Result};
use dialoguer::Confirm;
use extdoctor_core::platform::ConsoleUninstaller;
use extdoctor_extensions::{ForcedRemoval, Remover};
use tabled::{settings::Style, Table, Tabled};

use super::{open_context, require_record};
use crate::cli::{SiteArgs, UninstallArgs};
use crate::output;

#[derive(Tabled)]
struct RemovalRow {
    id: i64,
    #[tabled(rename = "tables dropped")]
    tables: usize,
    #[tabled(rename = "paths removed")]
    removed: usize,
    #[tabled(rename = "paths kept")]
    kept: usize,
    #[tabled(rename = "row removed")]
    row_removed: &'static str,
}

impl From<&ForcedRemoval> for RemovalRow {
    fn from(report: &ForcedRemoval) -> Self {
        Self {
            id: report.extension_id,
            tables: report.tables_dropped.len(),
            removed: report.paths_removed.len(),
            kept: report.paths_skipped.len(),
            row_removed: output::yes_no(report.record_removed),
        }
    }
}

/// Uninstall extensions, in the order given
///
/// Supports:
/// - Platform uninstall: `extdoctor uninstall 42 43`
/// - Without install scripts: `extdoctor uninstall 42 --skip-scripts`
/// - Forced wipe: `extdoctor uninstall 42 --force -y`
pub fn run(args: UninstallArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;

    output::header("Extensions to uninstall");
    for id in &args.ids {
        let record = require_record(&ctx, *id)?;
        println!("  #{} {} ({})", record.id(), record.name(), record.kind());
    }

    let mode = if args.force {
        "force-remove (files, folders and tables are deleted directly)"
    } else if args.skip_scripts {
        "uninstall without install scripts"
    } else {
        "uninstall"
    };

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("{} {} extension(s)?", mode, args.ids.len()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    let uninstaller = ConsoleUninstaller::from_config(ctx.config());
    let remover = Remover::new(&ctx, &uninstaller);
    let spinner = output::spinner(&format!("Processing {} extension(s)...", args.ids.len()));

    let result = if args.force {
        remover.forced(&args.ids).map(Some)
    } else if args.skip_scripts {
        remover.skip_scripts(&args.ids).map(|_| None)
    } else {
        remover.polite(&args.ids).map(|_| None)
    };
    spinner.finish_and_clear();

    let reports = match result {
        Ok(reports) => reports,
        Err(e) => {
            output::error(&format!("Uninstall stopped: {}", e));
            bail!("Uninstall failed; extensions after the failing one were not processed");
        }
    };

    if let Some(reports) = reports {
        let rows: Vec<RemovalRow> = reports.iter().map(RemovalRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);

        for report in &reports {
            for path in &report.paths_skipped {
                output::warning(&format!("#{}: left platform path {}", report.extension_id, path));
            }
        }
        if reports.iter().any(|report| !report.record_removed) {
            output::warning("Extension rows were kept; remove them from the administrator");
        }
    }

    output::success(&format!("Processed {} extension(s)", args.ids.len()));
    Ok(())
}
