//! Package command

use anyhow::{bail, Result};
use extdoctor_core::platform::ExtensionFilter;
use extdoctor_core::types::Client;
use serde::Serialize;
use std::collections::HashSet;
use tabled::{settings::Style, Table, Tabled};

use super::{open_context, require_record};
use crate::cli::{PackageArgs, SiteArgs};
use crate::output;

/// One `<file>` entry of the package manifest
#[derive(Tabled, Serialize)]
struct DeclaredRow {
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    kind: String,
    element: String,
    client: String,
    folder: String,
    #[tabled(rename = "extension")]
    extension_id: String,
    #[tabled(rename = "member")]
    status: &'static str,
}

/// An extension that names the package as its parent without being declared
#[derive(Tabled, Serialize)]
struct StowawayRow {
    id: i64,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    kind: String,
    element: String,
}

#[derive(Serialize)]
struct PackageReport {
    extension_id: i64,
    element: String,
    has_manifest: bool,
    declared: Vec<DeclaredRow>,
    undeclared_members: Vec<StowawayRow>,
}

/// Show a package's declared contents and how they map onto installed rows
pub fn run(args: PackageArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;
    let package = require_record(&ctx, args.id)?;

    if !package.is_package() {
        bail!("Extension {} is a {}, not a package", package.id(), package.kind());
    }

    let declared: Vec<DeclaredRow> = package
        .subextensions_with_meta(&ctx)
        .iter()
        .map(|sub| {
            let status = match &sub.record {
                None => "missing",
                Some(child) if child.package_id() == package.id() => "adopted",
                Some(child) if child.package_id() == 0 => "not adopted",
                Some(_) => "wrong parent",
            };
            DeclaredRow {
                kind: sub.criteria.kind.to_string(),
                element: sub.criteria.element.clone(),
                client: sub
                    .criteria
                    .client
                    .map_or_else(|| "-".to_string(), |id| Client::from_id(Some(id)).to_string()),
                folder: sub.criteria.folder.clone().unwrap_or_else(|| "-".to_string()),
                extension_id: sub
                    .record
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |child| child.id().to_string()),
                status,
            }
        })
        .collect();

    let declared_ids: HashSet<i64> = package
        .subextensions(&ctx)
        .iter()
        .map(|child| child.id())
        .collect();
    let undeclared_members: Vec<StowawayRow> = ctx
        .store()
        .list_extensions(&ExtensionFilter {
            package_id: Some(package.id()),
            ..Default::default()
        })?
        .into_iter()
        .filter(|row| !declared_ids.contains(&row.extension_id))
        .map(|row| StowawayRow {
            id: row.extension_id,
            kind: row.kind,
            element: row.element,
        })
        .collect();

    let report = PackageReport {
        extension_id: package.id(),
        element: package.element().to_string(),
        has_manifest: package.has_manifest(),
        declared,
        undeclared_members,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::header(&format!("#{} {}", package.id(), package.name()));
    if !report.has_manifest {
        output::warning("The package manifest is missing; its contents are unknown");
        return Ok(());
    }

    if report.declared.is_empty() {
        output::info("The manifest declares no extensions");
    } else {
        let mut table = Table::new(&report.declared);
        table.with(Style::sharp());
        println!("{}", table);
    }

    if !report.undeclared_members.is_empty() {
        output::header("Members the manifest does not declare");
        let mut table = Table::new(&report.undeclared_members);
        table.with(Style::sharp());
        println!("{}", table);
    }

    if package.has_extensions_to_adopt(&ctx) {
        output::info("Declared extensions without this parent can be fixed with the `adopt` action");
    }

    Ok(())
}
