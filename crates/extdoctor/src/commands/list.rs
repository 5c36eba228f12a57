//! List command

use anyhow::Result;
use extdoctor_core::platform::ExtensionFilter;
use extdoctor_issues::Doctor;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::open_context;
use crate::cli::{ListArgs, SiteArgs};
use crate::output;

/// One extension, as listed
#[derive(Tabled, Serialize)]
struct ExtensionListRow {
    id: i64,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    kind: String,
    element: String,
    folder: String,
    client: String,
    enabled: &'static str,
    core: &'static str,
}

/// One extension with its issue summary
#[derive(Tabled, Serialize)]
struct ExtensionIssuesRow {
    #[tabled(inline)]
    #[serde(flatten)]
    extension: ExtensionListRow,
    #[tabled(skip)]
    issue_count: Option<usize>,
    #[tabled(skip)]
    highest_severity: Option<String>,
    issues: String,
}

/// List extensions with optional filtering
///
/// Supports:
/// - All extensions: `extdoctor list`
/// - By type: `extdoctor list --type plugin`
/// - By name: `extdoctor list --search foo`
/// - With issue summary: `extdoctor list --issues`
pub fn run(args: ListArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;
    let doctor = Doctor::new(&ctx);

    let filter = ExtensionFilter {
        kind: args.kind,
        search: args.search.clone(),
        ..Default::default()
    };

    let mut rows = Vec::new();
    for row in ctx.store().list_extensions(&filter)? {
        let mut listed = ExtensionListRow {
            id: row.extension_id,
            kind: row.kind.clone(),
            element: row.element.clone(),
            folder: row.folder().unwrap_or("-").to_string(),
            client: row.client().to_string(),
            enabled: "?",
            core: "?",
        };

        // Unsupported rows are still listed, with the reason in the issue column
        let (issue_count, highest_severity, issues) = match ctx.make(row) {
            Ok(record) => {
                listed.enabled = output::yes_no(record.is_enabled());
                listed.core = output::yes_no(record.is_core());

                if args.issues {
                    let manager = doctor.issues_for(&record);
                    let highest = manager.highest_severity().map(|s| s.to_string());
                    let summary = match &highest {
                        Some(severity) => format!("{} ({})", manager.issues().len(), severity),
                        None => "-".to_string(),
                    };
                    (Some(manager.issues().len()), highest, summary)
                } else {
                    (None, None, String::new())
                }
            }
            Err(e) => (None, None, e.to_string()),
        };

        rows.push(ExtensionIssuesRow {
            extension: listed,
            issue_count,
            highest_severity,
            issues,
        });
    }

    if rows.is_empty() && !args.json {
        output::info("No extensions match");
        return Ok(());
    }

    if args.issues {
        print_rows(&rows, args.json)?;
    } else {
        let plain: Vec<ExtensionListRow> = rows.into_iter().map(|r| r.extension).collect();
        print_rows(&plain, args.json)?;
    }

    Ok(())
}

fn print_rows<T: Tabled + Serialize>(rows: &[T], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);
        println!("\n{} extension(s)", rows.len());
    }
    Ok(())
}
