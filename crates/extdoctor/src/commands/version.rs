//! Version command

use anyhow::Result;
use extdoctor_core::platform::SqliteStore;
use extdoctor_issues::rules::RULES;
use serde::Serialize;
use tracing::debug;

use super::load_config;
use crate::cli::{SiteArgs, VersionArgs};
use crate::output;

/// What this build is and which site it would audit
#[derive(Debug, Clone, Serialize)]
struct VersionReport {
    version: &'static str,
    commit: Option<&'static str>,
    build_date: Option<&'static str>,
    profile: Option<&'static str>,
    sqlite: &'static str,
    issue_rules: usize,
    site_root: Option<String>,
    database: Option<String>,
}

impl VersionReport {
    fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("EXTDOCTOR_COMMIT"),
            build_date: option_env!("EXTDOCTOR_BUILD_DATE"),
            profile: option_env!("EXTDOCTOR_PROFILE"),
            sqlite: SqliteStore::library_version(),
            issue_rules: RULES.len(),
            site_root: None,
            database: None,
        }
    }

    /// `extdoctor 1.2.3 (abc12345, release)`
    fn headline(&self) -> String {
        let build: Vec<&str> = [self.commit, self.profile].into_iter().flatten().collect();
        if build.is_empty() {
            format!("extdoctor {}", self.version)
        } else {
            format!("extdoctor {} ({})", self.version, build.join(", "))
        }
    }
}

pub fn run(args: VersionArgs, site: &SiteArgs) -> Result<()> {
    let mut report = VersionReport::current();

    // A missing or broken configuration must not stop the version output
    match load_config(site) {
        Ok(config) => {
            report.site_root = Some(config.site.root.to_string());
            report.database = config.database.path.map(|path| path.to_string());
        }
        Err(e) => debug!("No site configuration to report: {:#}", e),
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.headline());
    if let Some(date) = report.build_date {
        output::kv("Built", date);
    }
    output::kv("SQLite", report.sqlite);
    output::kv("Issue rules", &report.issue_rules.to_string());
    output::kv("Site root", report.site_root.as_deref().unwrap_or("-"));
    output::kv("Database", report.database.as_deref().unwrap_or("-"));

    Ok(())
}
