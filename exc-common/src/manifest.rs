use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the manifest at the root of every bundle.
pub const MANIFEST_FILE: &str = "info.json";

/// Package manifest (`info.json`).
///
/// Every field is optional on disk; `run` is only checked when the package is
/// about to be executed.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Shell command run from the package directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl Manifest {
    /// Load a manifest from a specific path.
    pub fn load(path: &Path) -> Result<Self, CommonError> {
        let content = fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "read manifest");
        Ok(manifest)
    }

    /// Save the manifest to a specific path.
    pub fn save(&self, path: &Path) -> Result<(), CommonError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "wrote manifest");
        Ok(())
    }

    /// The run command, if present and not blank.
    pub fn run_command(&self) -> Option<&str> {
        self.run
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
    }

    pub fn version_or_unknown(&self) -> &str {
        self.version.as_deref().unwrap_or("unknown")
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }
}
