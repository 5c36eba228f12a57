//! Path normalization and existence checks relative to the site root
//!
//! Every path the extension model derives is stored root-relative with
//! forward slashes (`administrator/components/com_foo`). This module turns
//! those into absolute paths and answers existence questions, treating a
//! dangling symlink as absent.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Runs of forward or backward slashes
static SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\]+").expect("separator regex is valid"));

/// Normalize separators and collapse duplicate slashes
///
/// A leading slash is kept, a trailing one is dropped.
pub fn normalize(path: &str) -> String {
    let collapsed = SEPARATORS_RE.replace_all(path.trim(), "/");

    if collapsed == "/" {
        return collapsed.into_owned();
    }

    collapsed.trim_end_matches('/').to_string()
}

/// Join two root-relative fragments, skipping empty ones
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => normalize(rest),
        (_, true) => normalize(base),
        _ => normalize(&format!("{}/{}", base, rest)),
    }
}

/// Whether `path` exists, following symlinks
///
/// A symlink whose target is missing is reported as absent. Any other path
/// behaves like [`Path::exists`].
pub fn file_really_exists(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::metadata(path).is_ok(),
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Resolves root-relative paths against a site installation
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    root: Utf8PathBuf,
}

impl PathNormalizer {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: Utf8PathBuf::from(normalize(root.into().as_str())),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute form of a root-relative path
    pub fn absolute(&self, relative: &str) -> Utf8PathBuf {
        let relative = normalize(relative);
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Root-relative form of a path
    ///
    /// Absolute paths under the root lose the root prefix; anything else is
    /// normalized and stripped of its leading slash.
    pub fn relative(&self, path: &str) -> String {
        let path = normalize(path);
        let root = self.root.as_str();

        if path == root {
            return String::new();
        }

        match path.strip_prefix(root) {
            Some(rest) if rest.starts_with('/') || root.ends_with('/') => {
                rest.trim_start_matches('/').to_string()
            }
            _ => path.trim_start_matches('/').to_string(),
        }
    }

    /// Whether `path` lies inside the site root
    ///
    /// Relative paths are inside unless they climb out with `..`; absolute
    /// ones must start with the root.
    pub fn contains(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.split('/').any(|segment| segment == "..") {
            return false;
        }
        if !Path::new(&path).is_absolute() {
            return true;
        }

        let root = self.root.as_str();
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/') || root.ends_with('/'))
    }

    /// Where a path truly exists on disk
    ///
    /// The root-relative reading wins. An absolute path that only exists
    /// as given, outside the root, resolves to itself.
    pub fn resolve(&self, path: &str) -> Option<Utf8PathBuf> {
        let under_root = self.absolute(&self.relative(path));
        if file_really_exists(under_root.as_std_path()) {
            return Some(under_root);
        }

        let literal = Utf8PathBuf::from(normalize(path));
        (literal.is_absolute() && file_really_exists(literal.as_std_path())).then_some(literal)
    }

    /// Whether the path truly exists
    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Whether the path truly exists and is a directory
    pub fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|found| found.is_dir())
    }

    /// Whether the path truly exists and is a file
    pub fn is_file(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|found| found.is_file())
    }

    /// Names of the immediate children of a root-relative directory
    ///
    /// Unreadable or missing directories yield an empty list.
    pub fn list_dir(&self, relative: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.absolute(relative)) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Contents of a file, `None` if unreadable
    pub fn read_to_string(&self, path: &str) -> Option<String> {
        fs::read_to_string(self.resolve(path)?).ok()
    }
}
