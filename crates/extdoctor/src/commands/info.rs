//! Info command

use anyhow::Result;
use extdoctor_core::types::InstallState;
use extdoctor_issues::Doctor;
use owo_colors::OwoColorize;

use super::{open_context, require_record};
use crate::cli::{InfoArgs, SiteArgs};
use crate::output;

/// Show everything the audit derives for one extension
///
/// Displays:
/// - Row identity and flags
/// - Footprint: directories, files, translations, media, tables
/// - Manifest, install script and update servers
/// - Registered update sites and the schema baseline
/// - Issues, most severe first
pub fn run(args: InfoArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;
    let record = require_record(&ctx, args.id)?;
    let manager = Doctor::new(&ctx).issues_for(&record);

    let mut issues = manager.issues().to_vec();
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    let state = match record.row().install_state() {
        InstallState::Installed => "installed",
        InstallState::Discovered => "discovered",
        InstallState::Broken => "broken",
    };
    let parent = record.parent_package(&ctx).map(|parent| parent.id());
    let claimed_by = ctx.adoption_index().which_package(record.id());
    let update_sites = record.update_sites(&ctx);

    if args.json {
        let json_output = serde_json::json!({
            "extension_id": record.id(),
            "name": record.name(),
            "type": record.kind(),
            "element": record.element(),
            "folder": record.folder(),
            "client": record.client(),
            "version": record.row().version(),
            "state": state,
            "enabled": record.is_enabled(),
            "protected": record.is_protected(),
            "locked": record.is_locked(),
            "core": record.is_core(),
            "installed": record.is_installed(),
            "package_id": record.package_id(),
            "parent_package": parent,
            "claimed_by": claimed_by,
            "manifest": record.manifest_path(),
            "has_manifest": record.has_manifest(),
            "script": record.script_path(),
            "directories": record.directories(),
            "files": record.files(),
            "language_files": record.language_files(),
            "media": record.media_paths(),
            "tables": record.tables(),
            "update_servers": record.canonical_update_servers(),
            "update_sites": update_sites,
            "schema_version": ctx.schema_version(record.id()),
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    output::header(&format!("#{} {}", record.id(), record.name()));
    output::kv("Type", record.kind().as_str());
    output::kv("Element", record.element());
    output::kv("Folder", record.folder().unwrap_or("-"));
    output::kv("Client", record.client().as_str());
    output::kv("Version", record.row().version().as_deref().unwrap_or("-"));
    output::kv("State", state);
    output::kv("Enabled", output::yes_no(record.is_enabled()));
    output::kv("Protected", output::yes_no(record.is_protected()));
    output::kv("Locked", output::yes_no(record.is_locked()));
    output::kv("Core", output::yes_no(record.is_core()));
    output::kv("Installed", output::yes_no(record.is_installed()));

    output::header("Packaging");
    output::kv("Package id", &record.package_id().to_string());
    output::kv(
        "Parent package",
        &parent.map_or_else(|| "-".to_string(), |id| id.to_string()),
    );
    output::kv(
        "Declared by",
        &claimed_by.map_or_else(|| "-".to_string(), |id| id.to_string()),
    );

    output::header("Footprint");
    let manifest = match record.manifest_path() {
        Some(path) if record.has_manifest() => path.to_string(),
        Some(path) => format!("{} {}", path, "(missing or unreadable)".dimmed()),
        None => "-".to_string(),
    };
    output::kv("Manifest", &manifest);
    output::kv("Script", record.script_path().unwrap_or("-"));
    output::kv_list("Directories", record.directories());
    output::kv_list("Files", record.files());
    output::kv_list("Language files", record.language_files());
    output::kv_list("Media", record.media_paths());
    output::kv_list("Tables", record.tables());

    output::header("Updates");
    output::kv_list("Update servers", record.canonical_update_servers());
    let sites: Vec<String> = update_sites
        .iter()
        .map(|site| {
            let flag = if site.enabled { "enabled" } else { "disabled" };
            format!("#{} {} ({})", site.update_site_id, site.location, flag)
        })
        .collect();
    output::kv_list("Update sites", &sites);
    output::kv("Schema version", ctx.schema_version(record.id()).unwrap_or("-"));
    let schema_errors: Vec<String> = record
        .schema_errors(&ctx)
        .iter()
        .map(ToString::to_string)
        .collect();
    output::kv_list("Schema problems", &schema_errors);

    output::header("Issues");
    if issues.is_empty() {
        output::success("No issues");
    }
    for issue in &issues {
        println!(
            "  {:<9} {} {}",
            issue.severity.as_str(),
            issue.label,
            format!("[{}]", issue.slug).dimmed()
        );
        if !issue.actions.is_empty() {
            println!("            fix with: {}", issue.actions.join(", ").yellow());
        }
    }

    Ok(())
}
