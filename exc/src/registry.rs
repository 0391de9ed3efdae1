//! Install registry: one directory per installed package under a fixed root.
//!
//! Nothing is cached; every call reads the filesystem again.

use crate::error::{ExcError, Result};
use exc_common::manifest::{Manifest, MANIFEST_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// State of an installed package's `info.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestStatus {
    Loaded(Manifest),
    Missing,
    Corrupt(String),
}

#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub path: PathBuf,
    pub manifest: ManifestStatus,
}

#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory a package with this name lives in. Does not touch the disk.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.path(name).is_dir()
    }

    pub fn manifest(&self, name: &str) -> ManifestStatus {
        read_status(&self.path(name))
    }

    /// All installed packages, sorted by name.
    ///
    /// Entries whose manifest cannot be read are still listed.
    pub fn list(&self) -> Result<Vec<InstalledPackage>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut packages = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let manifest = read_status(&path);
            packages.push(InstalledPackage {
                name,
                path,
                manifest,
            });
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Delete an installed package. Callers confirm first.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.has(name) {
            return Err(ExcError::NotInstalled {
                name: name.to_string(),
            });
        }
        let path = self.path(name);
        fs::remove_dir_all(&path)?;
        tracing::debug!(path = %path.display(), "removed package directory");
        Ok(())
    }
}

fn read_status(package_dir: &Path) -> ManifestStatus {
    let manifest_path = package_dir.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return ManifestStatus::Missing;
    }
    match Manifest::load(&manifest_path) {
        Ok(manifest) => ManifestStatus::Loaded(manifest),
        Err(err) => {
            tracing::debug!(path = %manifest_path.display(), "unreadable manifest: {err}");
            ManifestStatus::Corrupt(err.to_string())
        }
    }
}
