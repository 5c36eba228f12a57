//! Reverse index from sub-extension to the package that declares it

use crate::context::AuditContext;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Which package claims which extension
///
/// Built once per context from every package's manifest. The first package
/// (by id) declaring an extension is its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageAdoptionIndex {
    owners: HashMap<i64, i64>,
    wrong_package: HashSet<i64>,
}

impl PackageAdoptionIndex {
    pub fn build(ctx: &AuditContext) -> Self {
        let mut index = Self::default();

        let mut package_ids: Vec<i64> = ctx.package_ids().iter().copied().collect();
        package_ids.sort_unstable();

        for package_id in package_ids {
            let package = match ctx.record_by_id(package_id) {
                Ok(Some(package)) => package,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Package {} skipped in adoption index: {}", package_id, e);
                    continue;
                }
            };

            for sub in package.subextensions(ctx) {
                let owner = *index.owners.entry(sub.id()).or_insert(package_id);
                if owner != package_id {
                    debug!(
                        "Extension {} declared by packages {} and {}",
                        sub.id(),
                        owner,
                        package_id
                    );
                }

                if sub.package_id() != 0 && sub.package_id() != package_id {
                    index.wrong_package.insert(sub.id());
                }
            }
        }

        debug!(
            "Adoption index: {} claimed, {} with a wrong package id",
            index.owners.len(),
            index.wrong_package.len()
        );
        index
    }

    /// Id of the package declaring this extension
    pub fn which_package(&self, extension_id: i64) -> Option<i64> {
        self.owners.get(&extension_id).copied()
    }

    /// Whether the extension's stored package id disagrees with a package claiming it
    pub fn has_wrong_package_id(&self, extension_id: i64) -> bool {
        self.wrong_package.contains(&extension_id)
    }
}
