//! Check command - run every issue rule over the site

use anyhow::{Context, Result};
use extdoctor_issues::{Doctor, DoctorOptions, OutputFormat, Severity};

use super::open_context;
use crate::cli::{CheckArgs, SiteArgs};

/// Run the site-wide diagnostic
pub fn run(args: CheckArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;

    let min_severity = match args.min_severity {
        Some(severity) => severity,
        None => ctx
            .config()
            .report
            .min_severity
            .parse::<Severity>()
            .context("Invalid report.min_severity")?,
    };

    let options = DoctorOptions {
        id: args.id,
        kind: args.kind,
        min_severity,
        ci: args.ci,
    };

    let format = match args.format.to_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "yaml" | "yml" => OutputFormat::Yaml,
        _ => OutputFormat::Human,
    };

    let result = Doctor::new(&ctx).run(&options)?;

    if args.verbose_output {
        println!("{}", result.format_verbose(format));
    } else {
        println!("{}", result.format(format));
    }

    // In CI mode, exit with appropriate code
    if options.ci {
        let exit_code = result.exit_code();
        if exit_code != 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
