//! Shared fixtures for extdoctor-core integration tests

#![allow(dead_code)]
#![allow(unused_imports)]

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A throwaway site root with a database file beside it
pub struct TempSite {
    _temp: TempDir,
    root: Utf8PathBuf,
    db: Utf8PathBuf,
}

impl TempSite {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("temp dir is not UTF-8: {}", p.display()))?;
        let root = base.join("site");
        fs::create_dir_all(&root)?;

        Ok(Self {
            _temp: temp,
            root,
            db: base.join("site.db"),
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn db(&self) -> &Utf8Path {
        &self.db
    }

    /// Write a file below the site root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Install a locale in one application area
    pub fn locale(&self, area: &str, tag: &str) -> Result<()> {
        self.write(&format!("{}/{}/langmetadata.xml", area, tag), "<metafile/>")
    }
}
