//! On-disk template fixtures.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary source directory populated with template files.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct TemplateTree {
    dir: TempDir,
}

impl TemplateTree {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("Failed to create temporary template directory")?,
        })
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write template: {}", path.display()))?;
        Ok(path)
    }

    /// Builder-style [`TemplateTree::write`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn with_file(self, relative: &str, content: &str) -> Result<Self> {
        self.write(relative, content)?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
