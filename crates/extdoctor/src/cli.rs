//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use extdoctor_core::types::ExtensionType;
use extdoctor_issues::Severity;

/// extdoctor - audit and repair the extensions of a Joomla site
#[derive(Parser, Debug)]
#[command(name = "extdoctor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub site: SiteArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the audited site and its configuration live
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Site root, overriding the configuration
    #[arg(long, global = true)]
    pub root: Option<Utf8PathBuf>,

    /// SQLite database holding the site's tables, overriding the configuration
    #[arg(long, global = true)]
    pub db: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every issue check and report the results
    Check(CheckArgs),

    /// List extensions
    List(ListArgs),

    /// Show what extdoctor knows about one extension
    Info(InfoArgs),

    /// Show a package's declared contents and their state
    Package(PackageArgs),

    /// Apply a fix action to an extension's issue
    Fix(FixArgs),

    /// Uninstall extensions
    Uninstall(UninstallArgs),

    /// Write one column of an extension row
    Set(SetArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Check only this extension
    #[arg(long)]
    pub id: Option<i64>,

    /// Check only extensions of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<ExtensionType>,

    /// Hide issues below this severity
    #[arg(long)]
    pub min_severity: Option<Severity>,

    /// Output format (human, json, yaml)
    #[arg(short, long, default_value = "human")]
    pub format: String,

    /// Show issue descriptions and per-severity counts
    #[arg(long)]
    pub verbose_output: bool,

    /// CI mode: exit with code 1 when errors are found
    #[arg(long)]
    pub ci: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only extensions of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<ExtensionType>,

    /// Substring of the name or element
    #[arg(short, long)]
    pub search: Option<String>,

    /// Add issue counts and the highest severity
    #[arg(long)]
    pub issues: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Extension id
    pub id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Package extension id
    pub id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct FixArgs {
    /// Extension id
    pub id: i64,

    /// Issue slug, name or qualified id
    pub issue: String,

    /// Fix action; the issue's default when omitted
    #[arg(short, long, default_value = "")]
    pub action: String,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Extension ids, processed in order
    #[arg(required = true)]
    pub ids: Vec<i64>,

    /// Move install scripts aside while uninstalling
    #[arg(long, conflicts_with = "force")]
    pub skip_scripts: bool,

    /// Delete files, folders and tables without the platform installer
    #[arg(short, long)]
    pub force: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Extension id
    pub id: i64,

    /// Column name, e.g. enabled, protected, package_id
    pub field: String,

    pub value: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
