//! Set command

use anyhow::{Context, Result};

use super::{open_context, require_record};
use crate::cli::{SetArgs, SiteArgs};
use crate::output;

/// Write one column of an extension row
///
/// `extdoctor set 42 protected 0`
pub fn run(args: SetArgs, site: &SiteArgs) -> Result<()> {
    let ctx = open_context(site)?;
    let record = require_record(&ctx, args.id)?;

    record
        .set_field_name(&ctx, &args.field, &args.value)
        .with_context(|| format!("Failed to set {} on extension {}", args.field, args.id))?;

    output::success(&format!(
        "Extension {} ({}): {} = {}",
        record.id(),
        record.element(),
        args.field,
        args.value
    ));
    Ok(())
}
