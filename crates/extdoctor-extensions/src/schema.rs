//! Schema baseline checks
//!
//! Extensions with a row in `#__schemas` track the version of their last
//! applied update SQL file. The update directory named in the manifest is
//! the reference: its newest file gives the expected version, and the
//! tables its files create must exist in the live database.

use extdoctor_core::paths::PathNormalizer;
use semver::Version;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One way an extension's schema differs from what it ships
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaError {
    /// Stored baseline is not the newest update file
    VersionMismatch { stored: String, expected: String },
    /// A table created by an update file is not in the database
    MissingTable { table: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch { stored, expected } => {
                write!(f, "schema version is {} but the newest update is {}", stored, expected)
            }
            Self::MissingTable { table } => write!(f, "table #__{} does not exist", table),
        }
    }
}

/// Versions of the `.sql` files in an update directory, oldest first
pub fn update_versions(paths: &PathNormalizer, dir: &str) -> Vec<String> {
    let mut versions: Vec<String> = paths
        .list_dir(dir)
        .into_iter()
        .filter_map(|name| {
            let lower = name.to_ascii_lowercase();
            lower
                .ends_with(".sql")
                .then(|| name[..name.len() - 4].to_string())
        })
        .filter(|stem| !stem.is_empty())
        .collect();

    versions.sort_by(|a, b| compare_versions(a, b));
    versions
}

/// The newest update file version, if the directory has any
pub fn newest_update_version(paths: &PathNormalizer, dir: &str) -> Option<String> {
    update_versions(paths, dir).pop()
}

/// Order update-file versions such as `1.2`, `1.2.1` and `4.0.0-2020-05-29`
///
/// The leading dotted numbers compare as a semantic version, padded with
/// zeroes; whatever follows breaks ties, so a dated suffix sorts after the
/// bare release.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (version_a, rest_a) = split_version(a);
    let (version_b, rest_b) = split_version(b);

    version_a.cmp(&version_b).then_with(|| rest_a.cmp(rest_b))
}

fn split_version(raw: &str) -> (Version, &str) {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (numbers, rest) = raw.split_at(end);

    let mut parts = numbers
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().unwrap_or(0));

    let version = Version::new(
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    );

    (version, rest)
}
